use anyhow::Result;
use async_trait::async_trait;
use incentive_import::constants::{LAW_ICMS_RJ_SPORT, UNDEFINED};
use incentive_import::error::ImportError;
use incentive_import::geo::{GeoLoader, GeoReference, GeoSource, StateEntry};
use incentive_import::pipeline::{Importer, RowOutcome};
use incentive_import::row::RowOptions;
use incentive_import::sheet::{Sheet, SheetSource};
use incentive_import::storage::InMemoryStore;
use incentive_import::types::{Cell, FieldValue};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Fails any fetch; the fixture cache must be used instead.
struct OfflineSource;

#[async_trait]
impl GeoSource for OfflineSource {
    async fn fetch_states(&self) -> incentive_import::error::Result<Vec<StateEntry>> {
        Err(ImportError::Config("network disabled in tests".into()))
    }

    async fn fetch_municipalities(&self) -> incentive_import::error::Result<Vec<Value>> {
        Err(ImportError::Config("network disabled in tests".into()))
    }
}

struct Sheets(HashMap<String, Sheet>);

impl SheetSource for Sheets {
    fn sheet(&mut self, name: &str) -> incentive_import::error::Result<Sheet> {
        self.0.get(name).cloned().ok_or_else(|| ImportError::MissingSheet {
            sheet: name.to_string(),
            available: self.0.keys().cloned().collect::<Vec<_>>().join(", "),
        })
    }
}

async fn fixture_geo() -> Result<GeoReference> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/geo_cache.json");
    let loader = GeoLoader::new(path, Box::new(OfflineSource));
    Ok(loader.load().await?)
}

fn text(value: &str) -> Cell {
    if value.is_empty() {
        Cell::Empty
    } else {
        Cell::from(value)
    }
}

/// Builds a sheet in the layout of the 2014-2025 tab.
fn project_sheet(name: &str, rows: &[[&str; 7]], years: &[f64]) -> Sheet {
    let header = ["PROJETO", "PROPONENTE", "LEI", "APORTADO", "ESTADO", "MUNICÍPIO", "INDICAÇÃO", "ANO"];
    let mut cells = vec![header.iter().map(|h| Cell::from(*h)).collect::<Vec<_>>()];
    for (row, year) in rows.iter().zip(years) {
        let mut line: Vec<Cell> = row.iter().map(|v| text(v)).collect();
        line.push(Cell::Number(*year));
        cells.push(line);
    }
    Sheet::from_rows(name, cells)
}

fn strings(value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::Array(items) => items
            .iter()
            .map(|item| match item {
                FieldValue::String(s) => s.clone(),
                other => panic!("expected string, got {other:?}"),
            })
            .collect(),
        other => panic!("expected array, got {other:?}"),
    }
}

#[tokio::test]
async fn imports_rows_from_cached_reference() -> Result<()> {
    let geo = fixture_geo().await?;
    let store = InMemoryStore::new();
    let importer = Importer::new(Arc::new(geo), Arc::new(store.clone()), "projetos", RowOptions::default());

    let sheet = project_sheet(
        "2014-2025",
        &[
            ["Circo Social", "Instituto Lona", "ICMS RJ esporte", "R$ 1.234,56", "rj / SP", "volta redonda, Campinas", "Diretoria"],
            ["", "", "", "", "", "", ""],
            ["Banda Escola", "Associação Musical", "Rouanet", "1.234.567", "MG", "Ouro Prêto", ""],
        ],
        &[2019.0, 2019.0, 1800.0],
    );
    let mut sheets = Sheets(HashMap::from([("2014-2025".to_string(), sheet)]));

    let summary = importer.run(&mut sheets, &["2014-2025".to_string()]).await?;
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.written, 2);

    let docs = store.documents("projetos");
    let circo = &docs[0].fields;
    assert_eq!(circo["lei"], FieldValue::from(LAW_ICMS_RJ_SPORT));
    assert_eq!(circo["valorAprovado"], FieldValue::Double(1234.56));
    assert_eq!(strings(&circo["estados"]), ["Rio de Janeiro", "São Paulo"]);
    assert_eq!(strings(&circo["municipios"]), ["Campinas", "Volta Redonda"]);
    assert!(matches!(circo["dataAprovado"], FieldValue::Timestamp(_)));

    let banda = &docs[1].fields;
    assert_eq!(banda["valorAprovado"], FieldValue::Double(1234567.0));
    assert_eq!(strings(&banda["municipios"]), ["Ouro Preto"]);
    assert_eq!(banda["indicacao"], FieldValue::from(UNDEFINED));
    assert_eq!(banda["dataAprovado"], FieldValue::from(UNDEFINED));
    Ok(())
}

#[tokio::test]
async fn sets_are_never_empty_and_always_sorted() -> Result<()> {
    let geo = fixture_geo().await?;
    let store = InMemoryStore::new();
    let importer = Importer::new(Arc::new(geo), Arc::new(store.clone()), "projetos", RowOptions::default());

    let rows = [
        ["Sem Local", "Inst A", "FIA", "0", "", "", ""],
        ["Separadores", "Inst B", "FIA", "0", " / ", "-", ""],
        ["Vários", "Inst C", "FIA", "0", "SP/MG/SP", "São Paulo/Belo Horizonte/campinas/sao paulo", ""],
    ];
    let sheet = project_sheet("2005-2013", &rows, &[2010.0, 2011.0, 2012.0]);
    let mut sheets = Sheets(HashMap::from([("2005-2013".to_string(), sheet)]));
    importer.run(&mut sheets, &["2005-2013".to_string()]).await?;

    for doc in store.documents("projetos") {
        for key in ["estados", "municipios"] {
            let values = strings(&doc.fields[key]);
            assert!(!values.is_empty(), "{key} empty in {:?}", doc.fields["nome"]);
            let mut sorted = values.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(values, sorted);
        }
    }

    let docs = store.documents("projetos");
    assert_eq!(strings(&docs[0].fields["estados"]), [UNDEFINED]);
    assert_eq!(strings(&docs[1].fields["municipios"]), [UNDEFINED]);
    assert_eq!(
        strings(&docs[2].fields["municipios"]),
        ["Belo Horizonte", "Campinas", "São Paulo"]
    );
    Ok(())
}

#[tokio::test]
async fn single_row_import_reports_outcome() -> Result<()> {
    let geo = fixture_geo().await?;
    let store = InMemoryStore::new();
    let importer = Importer::new(Arc::new(geo), Arc::new(store.clone()), "projetos", RowOptions::default());

    let sheet = project_sheet("x", &[["", "Só Instituição", "Pronon", "10", "SP", "Campinas", ""]], &[2020.0]);
    let rows = sheet.records()?;
    let outcome = importer.import_row(&rows[0]).await;

    assert!(matches!(outcome, RowOutcome::Written { .. }));
    assert_eq!(store.documents("projetos")[0].fields["nome"], FieldValue::from(UNDEFINED));
    Ok(())
}

#[tokio::test]
async fn missing_cache_and_network_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let loader = GeoLoader::new(dir.path().join("absent.json"), Box::new(OfflineSource));
    assert!(loader.load().await.is_err());
    assert!(!dir.path().join("absent.json").exists());
}
