use crate::constants::{PROJECT_ACTIVE, PROJECT_COMPLIANCE, PROJECT_STATUS, UNDEFINED};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single spreadsheet cell, reduced to the shapes the importer cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Trimmed textual rendering of the cell, or `None` when it carries nothing.
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            Cell::Empty => return None,
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// Typed value of a document field. Timestamps stay distinct from strings so the
/// document store can encode them natively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    Array(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

pub type Document = BTreeMap<String, FieldValue>;

/// One normalized project, ready to be written to the `projetos` collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub name: String,
    pub institution: String,
    pub indication: String,
    pub law: String,
    pub approved_value: f64,
    pub approved_date: Option<DateTime<Utc>>,
    pub states: BTreeSet<String>,
    pub municipalities: BTreeSet<String>,
}

impl ProjectRecord {
    /// Field layout expected by the web application.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("nome".into(), self.name.as_str().into());
        doc.insert("instituicao".into(), self.institution.as_str().into());
        doc.insert("lei".into(), self.law.as_str().into());
        doc.insert("valorAprovado".into(), FieldValue::Double(self.approved_value));
        doc.insert("indicacao".into(), self.indication.as_str().into());
        doc.insert(
            "dataAprovado".into(),
            match self.approved_date {
                Some(ts) => FieldValue::Timestamp(ts),
                None => UNDEFINED.into(),
            },
        );
        doc.insert("estados".into(), string_array(&self.states));
        doc.insert("municipios".into(), string_array(&self.municipalities));
        doc.insert("status".into(), PROJECT_STATUS.into());
        doc.insert("ativo".into(), PROJECT_ACTIVE.into());
        doc.insert("compliance".into(), PROJECT_COMPLIANCE.into());
        doc.insert("empresas".into(), FieldValue::Array(Vec::new()));
        doc
    }
}

fn string_array(values: &BTreeSet<String>) -> FieldValue {
    FieldValue::Array(values.iter().map(|v| v.as_str().into()).collect())
}
