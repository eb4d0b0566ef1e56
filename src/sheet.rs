use crate::error::{ImportError, Result};
use crate::normalize::normalize;
use crate::types::Cell;
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// One spreadsheet line, keyed by the columns the importer reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Zero-based data row index within its sheet (header excluded).
    pub index: usize,
    pub project: Cell,
    pub proponent: Cell,
    pub law: Cell,
    pub value: Cell,
    pub state: Cell,
    pub municipality: Cell,
    pub indication: Cell,
    pub year: Cell,
}

/// Positions of the known columns in a sheet's header.
#[derive(Debug, Clone, PartialEq)]
struct ColumnMap {
    project: usize,
    proponent: usize,
    law: usize,
    state: usize,
    municipality: usize,
    indication: usize,
    value: Option<usize>,
    year: Option<usize>,
}

/// Header keys are compared through `normalize`, so case, padding and accents are ignored.
fn find_column(headers: &[String], key: &str) -> Option<usize> {
    headers.iter().position(|h| h == key)
}

impl ColumnMap {
    fn resolve(sheet: &str, headers: &[String]) -> Result<Self> {
        let required = |key: &str| {
            find_column(headers, key).ok_or_else(|| ImportError::MissingColumn {
                sheet: sheet.to_string(),
                column: key.to_string(),
            })
        };
        // "aportado 2024" and similar per-year headers count as the value column
        let value = find_column(headers, "aportado")
            .or_else(|| headers.iter().position(|h| h.starts_with("aportado")));

        Ok(Self {
            project: required("projeto")?,
            proponent: required("proponente")?,
            law: required("lei")?,
            state: required("estado")?,
            municipality: required("municipio")?,
            indication: required("indicacao")?,
            value,
            year: find_column(headers, "ano"),
        })
    }
}

/// A worksheet as header keys plus data rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// The first row is the header; the rest are data rows.
    pub fn from_rows(name: &str, mut rows: Vec<Vec<Cell>>) -> Self {
        let headers = if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0)
                .iter()
                .map(|c| c.as_text().map(|t| normalize(&t)).unwrap_or_default())
                .collect()
        };
        Self {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows mapped onto the importer's columns. Fails when a required column is absent.
    pub fn records(&self) -> Result<Vec<Row>> {
        let columns = ColumnMap::resolve(&self.name, &self.headers)?;
        debug!("Sheet '{}' columns: {:?}", self.name, self.headers);

        let pick = |cells: &[Cell], idx: usize| cells.get(idx).cloned().unwrap_or_default();
        let pick_opt = |cells: &[Cell], idx: Option<usize>| idx.map(|i| pick(cells, i)).unwrap_or_default();

        Ok(self
            .rows
            .iter()
            .enumerate()
            .map(|(index, cells)| Row {
                index,
                project: pick(cells, columns.project),
                proponent: pick(cells, columns.proponent),
                law: pick(cells, columns.law),
                value: pick_opt(cells, columns.value),
                state: pick(cells, columns.state),
                municipality: pick(cells, columns.municipality),
                indication: pick(cells, columns.indication),
                year: pick_opt(cells, columns.year),
            })
            .collect())
    }
}

/// Source of named sheets.
pub trait SheetSource {
    fn sheet(&mut self, name: &str) -> Result<Sheet>;
}

/// An opened `.xlsx`/`.xls`/`.ods` file.
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ImportError::SpreadsheetNotFound(path.display().to_string()));
        }
        let sheets = open_workbook_auto(path).map_err(|e| ImportError::Spreadsheet(e.to_string()))?;
        info!("Opened spreadsheet '{}'", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }
}

impl SheetSource for Workbook {
    fn sheet(&mut self, name: &str) -> Result<Sheet> {
        let names = self.sheet_names();
        if !names.iter().any(|n| n == name) {
            return Err(ImportError::MissingSheet {
                sheet: name.to_string(),
                available: names.join(", "),
            });
        }
        let range = self
            .sheets
            .worksheet_range(name)
            .map_err(|e| ImportError::Spreadsheet(e.to_string()))?;
        let rows = range
            .rows()
            .map(|r| r.iter().map(Cell::from).collect())
            .collect();
        Ok(Sheet::from_rows(name, rows))
    }
}
