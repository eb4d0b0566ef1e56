use crate::constants::{DEFAULT_MATCH_THRESHOLD, UNDEFINED};
use crate::geo::GeoReference;
use crate::law::map_law;
use crate::normalize::correct_name;
use crate::sheet::Row;
use crate::types::{Cell, ProjectRecord};
use crate::value::to_float;
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[/,-]\s*").expect("valid separator pattern"));

/// How state tokens are turned into canonical state names. One strategy per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateResolution {
    /// Case-insensitive lookup of two-letter abbreviations ("SP" -> "São Paulo").
    #[default]
    Abbreviation,
    /// Fuzzy correction against the list of state names.
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOptions {
    pub state_resolution: StateResolution,
    pub match_threshold: u8,
}

impl Default for RowOptions {
    fn default() -> Self {
        Self {
            state_resolution: StateResolution::default(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither project name nor institution is present.
    EmptyRow,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyRow => write!(f, "row has neither project name nor institution"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowResult {
    Record(ProjectRecord),
    Skip(SkipReason),
}

/// Splits a multi-valued cell on `/`, `,` or `-`, dropping blank pieces.
pub fn split_tokens(text: &str) -> Vec<String> {
    SEPARATOR_RE
        .split(text)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn text_or_undefined(cell: &Cell) -> String {
    cell.as_text().unwrap_or_else(|| UNDEFINED.to_string())
}

fn tokens_or_undefined(cell: &Cell, field: &str, label: &str) -> Vec<String> {
    match cell.as_text() {
        Some(text) => split_tokens(&text),
        None => {
            warn!("{}: no {} given, using '{}'", label, field, UNDEFINED);
            vec![UNDEFINED.to_string()]
        }
    }
}

fn ensure_not_empty(mut values: BTreeSet<String>) -> BTreeSet<String> {
    if values.is_empty() {
        values.insert(UNDEFINED.to_string());
    }
    values
}

/// Resolves state tokens to canonical names using the configured strategy.
pub fn resolve_states(tokens: &[String], geo: &GeoReference, options: &RowOptions) -> BTreeSet<String> {
    let mut states = BTreeSet::new();
    match options.state_resolution {
        StateResolution::Abbreviation => {
            let undefined_upper = UNDEFINED.to_uppercase();
            for token in tokens {
                let abbreviation = token.trim().to_uppercase();
                if abbreviation.is_empty() {
                    continue;
                }
                match geo.state_for_abbreviation(&abbreviation) {
                    Some(name) => {
                        states.insert(name.to_string());
                    }
                    None if abbreviation == undefined_upper => {
                        states.insert(UNDEFINED.to_string());
                    }
                    None => {
                        warn!("State abbreviation '{}' not recognized, keeping it", abbreviation);
                        states.insert(abbreviation);
                    }
                }
            }
        }
        StateResolution::Fuzzy => {
            let names = geo.state_names();
            for token in tokens {
                states.insert(correct_name(token, &names, options.match_threshold).name);
            }
        }
    }
    ensure_not_empty(states)
}

/// Corrects municipality tokens against every municipality of the resolved states.
/// Without any known state the tokens are kept verbatim.
pub fn resolve_municipalities(
    tokens: &[String],
    states: &BTreeSet<String>,
    geo: &GeoReference,
    threshold: u8,
) -> BTreeSet<String> {
    let context: Vec<&str> = states
        .iter()
        .filter(|s| s.as_str() != UNDEFINED)
        .flat_map(|s| geo.municipalities_of(s))
        .map(String::as_str)
        .collect();

    if context.is_empty() {
        debug!("No known state for municipality correction, keeping {:?}", tokens);
    }

    let municipalities = tokens
        .iter()
        .map(|token| {
            if context.is_empty() {
                token.clone()
            } else {
                correct_name(token, &context, threshold).name
            }
        })
        .collect();
    ensure_not_empty(municipalities)
}

/// Projects are dated January 1st of their year, 00:00 in Brasília (03:00 UTC).
pub fn approval_date(year: &Cell) -> Option<DateTime<Utc>> {
    match year {
        Cell::Number(y) if *y > 1900.0 && *y < 2100.0 => {
            Utc.with_ymd_and_hms(*y as i32, 1, 1, 3, 0, 0).single()
        }
        _ => None,
    }
}

/// Turns one spreadsheet row into a project record, or a skip signal.
pub fn process_row(row: &Row, geo: &GeoReference, options: &RowOptions) -> RowResult {
    let name = text_or_undefined(&row.project);
    let institution = text_or_undefined(&row.proponent);
    if name == UNDEFINED && institution == UNDEFINED {
        return RowResult::Skip(SkipReason::EmptyRow);
    }
    let label = if name == UNDEFINED {
        format!("row {}", row.index)
    } else {
        name.clone()
    };

    let indication = text_or_undefined(&row.indication);
    let law = row
        .law
        .as_text()
        .map(|text| map_law(&text))
        .unwrap_or_else(|| UNDEFINED.to_string());
    let approved_value = to_float(&row.value);

    let approved_date = approval_date(&row.year);
    if approved_date.is_none() {
        warn!("{}: invalid or missing year {:?}, approval date left undefined", label, row.year);
    }

    let state_tokens = tokens_or_undefined(&row.state, "state", &label);
    let states = resolve_states(&state_tokens, geo, options);

    let municipality_tokens = tokens_or_undefined(&row.municipality, "municipality", &label);
    let municipalities = resolve_municipalities(&municipality_tokens, &states, geo, options.match_threshold);

    RowResult::Record(ProjectRecord {
        name,
        institution,
        indication,
        law,
        approved_value,
        approved_date,
        states,
        municipalities,
    })
}
