use crate::constants::*;
use crate::error::Result;
use crate::normalize::normalize;
use crate::storage::DocumentStore;
use crate::types::{Document, FieldValue};
use std::collections::BTreeMap;
use tracing::info;

/// Laws listed on each state aggregate, with the multiplier used for their fixture counts.
const AGGREGATE_LAWS: [(&str, i64); 11] = [
    (LAW_CULTURE, 1),
    (LAW_PROAC, 2),
    (LAW_FIA, 3),
    (LAW_SPORT, 4),
    (LAW_ELDERLY, 5),
    (LAW_PRONAS, 6),
    (LAW_PRONON, 7),
    (LAW_PROMAC, 8),
    (LAW_ICMS_MG, 9),
    (LAW_ICMS_RJ, 10),
    (LAW_PIE, 10),
];

const AGGREGATE_SEGMENTS: [(&str, i64); 5] = [
    ("Cultura", 1),
    ("Esporte", 2),
    ("Pessoa Idosa", 3),
    ("Criança e Adolescente", 4),
    ("Saúde", 5),
];

/// Document id of a state: accent-free, lowercase, underscores for spaces.
pub fn state_slug(name: &str) -> String {
    normalize(name).split_whitespace().collect::<Vec<_>>().join("_")
}

fn counted(name: &str, count: i64) -> FieldValue {
    FieldValue::Map(BTreeMap::from([
        ("nome".to_string(), FieldValue::from(name)),
        ("qtdProjetos".to_string(), FieldValue::Integer(count)),
    ]))
}

/// Fixture statistics for the state at position `i` of the state list.
pub fn state_aggregate(i: i64, state: &str) -> Document {
    let mut doc = Document::new();
    doc.insert("beneficiariosDireto".into(), FieldValue::Integer(i));
    doc.insert("beneficiariosIndireto".into(), FieldValue::Integer(2 * i));
    doc.insert(
        "lei".into(),
        FieldValue::Array(AGGREGATE_LAWS.iter().map(|(law, m)| counted(law, m * i)).collect()),
    );
    doc.insert(
        "maiorAporte".into(),
        FieldValue::Map(BTreeMap::from([
            ("nome".to_string(), FieldValue::from(format!("Projeto em {state}"))),
            ("valorAportado".to_string(), FieldValue::Integer(10 * i)),
        ])),
    );
    doc.insert("municipios".into(), FieldValue::Array(vec![FieldValue::from("")]));
    doc.insert("nomeEstado".into(), FieldValue::from(state));
    doc.insert(
        "projetosODS".into(),
        FieldValue::Array((0..17).map(|j| FieldValue::Integer(i * j)).collect()),
    );
    doc.insert("qtdMunicipios".into(), FieldValue::Integer(5 * i));
    doc.insert("qtdOrganizacoes".into(), FieldValue::Integer(6 * i));
    doc.insert("qtdProjetos".into(), FieldValue::Integer(7 * i + 1));
    doc.insert(
        "segmento".into(),
        FieldValue::Array(AGGREGATE_SEGMENTS.iter().map(|(seg, m)| counted(seg, m * i)).collect()),
    );
    doc.insert("valorTotal".into(), FieldValue::Integer(8 * i));
    doc
}

/// Writes one aggregate document per state. Stops at the first failed write.
pub async fn seed_state_aggregates(store: &dyn DocumentStore, collection: &str) -> Result<usize> {
    for (i, state) in BRAZILIAN_STATES.iter().enumerate() {
        let id = state_slug(state);
        store.set(collection, &id, &state_aggregate(i as i64, state)).await?;
        info!("State document {} created", state);
    }
    Ok(BRAZILIAN_STATES.len())
}
