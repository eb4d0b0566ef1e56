use crate::error::Result;
use crate::geo::GeoReference;
use crate::row::{process_row, RowOptions, RowResult};
use crate::sheet::{Row, SheetSource};
use crate::storage::DocumentStore;
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// What happened to a single spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RowOutcome {
    Written { id: String },
    Skipped { reason: String },
    Failed { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
    pub sheet: String,
    pub row: usize,
    pub name: String,
    pub reason: String,
}

/// Totals for a whole import run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub sheets: Vec<String>,
    pub processed: usize,
    pub written: usize,
    pub skipped: usize,
    pub failures: Vec<RowFailure>,
}

impl ImportSummary {
    fn record(&mut self, sheet: &str, row: usize, outcome: &RowOutcome) {
        self.processed += 1;
        match outcome {
            RowOutcome::Written { .. } => self.written += 1,
            RowOutcome::Skipped { .. } => self.skipped += 1,
            RowOutcome::Failed { name, reason } => self.failures.push(RowFailure {
                sheet: sheet.to_string(),
                row,
                name: name.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

/// Runs the row pipeline over the configured sheets and writes one document per record.
pub struct Importer {
    geo: Arc<GeoReference>,
    store: Arc<dyn DocumentStore>,
    collection: String,
    options: RowOptions,
}

impl Importer {
    pub fn new(
        geo: Arc<GeoReference>,
        store: Arc<dyn DocumentStore>,
        collection: &str,
        options: RowOptions,
    ) -> Self {
        Self {
            geo,
            store,
            collection: collection.to_string(),
            options,
        }
    }

    /// Imports one row. Persistence failures are reported, never raised.
    pub async fn import_row(&self, row: &Row) -> RowOutcome {
        let record = match process_row(row, &self.geo, &self.options) {
            RowResult::Record(record) => record,
            RowResult::Skip(reason) => {
                info!("Skipping row {}: {}", row.index, reason);
                return RowOutcome::Skipped {
                    reason: reason.to_string(),
                };
            }
        };

        match self.store.add(&self.collection, &record.to_document()).await {
            Ok(id) => {
                info!("Project '{}' added with id {}", record.name, id);
                RowOutcome::Written { id }
            }
            Err(e) => {
                error!("Failed to add project '{}': {}", record.name, e);
                RowOutcome::Failed {
                    name: record.name,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Imports every row of one sheet, in order.
    #[instrument(skip(self, rows, summary))]
    pub async fn import_sheet(&self, sheet: &str, rows: &[Row], summary: &mut ImportSummary) {
        for row in rows {
            debug!("Processing row {}", row.index);
            let outcome = self.import_row(row).await;
            let label = match &outcome {
                RowOutcome::Written { .. } => "written",
                RowOutcome::Skipped { .. } => "skipped",
                RowOutcome::Failed { .. } => "failed",
            };
            counter!("import_rows_total", "sheet" => sheet.to_string(), "outcome" => label).increment(1);
            summary.record(sheet, row.index, &outcome);
        }
    }

    /// Imports the named sheets in order. A missing sheet or column aborts the run.
    pub async fn run(&self, source: &mut dyn SheetSource, sheets: &[String]) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        for name in sheets {
            let sheet = source.sheet(name)?;
            info!("Processing sheet '{}' ({} rows)", name, sheet.len());
            summary.sheets.push(name.clone());
            if sheet.is_empty() {
                info!("Sheet '{}' is empty, skipping", name);
                continue;
            }
            let rows = sheet.records()?;
            self.import_sheet(name, &rows, &mut summary).await;
        }

        info!(
            "Import finished: {} rows, {} written, {} skipped, {} failed",
            summary.processed,
            summary.written,
            summary.skipped,
            summary.failures.len()
        );
        if !summary.failures.is_empty() {
            warn!("{} rows could not be written", summary.failures.len());
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ImportError, StoreError};
    use crate::sheet::Sheet;
    use crate::storage::InMemoryStore;
    use crate::types::{Cell, Document, FieldValue};
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashMap};

    /// Rejects documents whose project name is listed.
    struct RejectingStore {
        inner: InMemoryStore,
        reject: Vec<String>,
    }

    #[async_trait]
    impl DocumentStore for RejectingStore {
        async fn add(&self, collection: &str, document: &Document) -> std::result::Result<String, StoreError> {
            let name = match document.get("nome") {
                Some(FieldValue::String(s)) => s.clone(),
                _ => String::new(),
            };
            if self.reject.contains(&name) {
                return Err(StoreError::Rejected {
                    status: 500,
                    body: "quota exceeded".into(),
                });
            }
            self.inner.add(collection, document).await
        }

        async fn set(&self, collection: &str, id: &str, document: &Document) -> std::result::Result<(), StoreError> {
            self.inner.set(collection, id, document).await
        }
    }

    struct FixedSheets(HashMap<String, Sheet>);

    impl SheetSource for FixedSheets {
        fn sheet(&mut self, name: &str) -> Result<Sheet> {
            self.0.get(name).cloned().ok_or_else(|| ImportError::MissingSheet {
                sheet: name.to_string(),
                available: String::new(),
            })
        }
    }

    fn geo() -> Arc<GeoReference> {
        Arc::new(GeoReference {
            states: BTreeMap::from([("Bahia".to_string(), "BA".to_string())]),
            municipalities_by_state: BTreeMap::from([(
                "Bahia".to_string(),
                vec!["Salvador".to_string(), "Feira de Santana".to_string()],
            )]),
            abbreviation_to_state: BTreeMap::from([("BA".to_string(), "Bahia".to_string())]),
        })
    }

    fn sheet(name: &str, projects: &[(&str, &str)]) -> Sheet {
        let mut rows = vec![["Projeto", "Proponente", "Lei", "Aportado", "Estado", "Município", "Indicação"]
            .iter()
            .map(|h| Cell::from(*h))
            .collect::<Vec<_>>()];
        for (project, proponent) in projects {
            rows.push(vec![
                Cell::from(*project),
                Cell::from(*proponent),
                Cell::from("FIA"),
                Cell::Number(5000.0),
                Cell::from("BA"),
                Cell::from("salvador"),
                Cell::Empty,
            ]);
        }
        Sheet::from_rows(name, rows)
    }

    #[tokio::test]
    async fn failed_write_does_not_stop_the_batch() {
        let inner = InMemoryStore::new();
        let store = Arc::new(RejectingStore {
            inner: inner.clone(),
            reject: vec!["Quebra".to_string()],
        });
        let importer = Importer::new(geo(), store, "projetos", RowOptions::default());
        let mut sheets = FixedSheets(HashMap::from([(
            "2014-2025".to_string(),
            sheet("2014-2025", &[("Capoeira", "Mestre"), ("Quebra", "Inst"), ("", ""), ("Teatro", "Cia")]),
        )]));

        let summary = importer.run(&mut sheets, &["2014-2025".to_string()]).await.unwrap();

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].name, "Quebra");
        assert_eq!(summary.written, summary.processed - summary.skipped - summary.failures.len());

        let written = inner.documents("projetos");
        assert_eq!(written.len(), 2);
        assert_eq!(written[1].fields["nome"], FieldValue::from("Teatro"));
        assert_eq!(
            written[0].fields["municipios"],
            FieldValue::Array(vec![FieldValue::from("Salvador")])
        );
    }

    #[tokio::test]
    async fn empty_sheet_is_skipped_and_missing_sheet_aborts() {
        let store = Arc::new(InMemoryStore::new());
        let importer = Importer::new(geo(), store, "projetos", RowOptions::default());
        let mut sheets = FixedSheets(HashMap::from([("2005-2013".to_string(), sheet("2005-2013", &[]))]));

        let summary = importer.run(&mut sheets, &["2005-2013".to_string()]).await.unwrap();
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.sheets, ["2005-2013"]);

        let err = importer
            .run(&mut sheets, &["2005-2013".to_string(), "1999".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingSheet { .. }));
    }
}
