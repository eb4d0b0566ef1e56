pub mod fuzz;

use crate::constants::UNDEFINED;
use crate::types::Cell;
use tracing::{debug, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Comparison key: lowercase, trimmed, with diacritics removed.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    stripped.trim().to_string()
}

/// Comparison key of a spreadsheet cell; anything but text yields an empty key.
pub fn normalize_cell(cell: &Cell) -> String {
    match cell {
        Cell::Text(text) => normalize(text),
        _ => String::new(),
    }
}

/// Outcome of a fuzzy correction attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub name: String,
    pub corrected: bool,
    /// Best similarity found, 0 when no comparison happened.
    pub score: u8,
}

impl Correction {
    fn unchanged(candidate: &str, score: u8) -> Self {
        Self {
            name: candidate.to_string(),
            corrected: false,
            score,
        }
    }
}

/// Resolves `candidate` to the closest entry of `reference`.
///
/// Scores are compared on normalized keys. The first entry in `reference`
/// order wins ties. When the best score is below `threshold` the candidate
/// is returned untouched.
pub fn correct_name<S: AsRef<str>>(candidate: &str, reference: &[S], threshold: u8) -> Correction {
    if candidate == UNDEFINED {
        return Correction::unchanged(candidate, 0);
    }
    let key = normalize(candidate);
    if key.is_empty() {
        return Correction::unchanged(candidate, 0);
    }

    let mut best: Option<(&str, u8)> = None;
    for entry in reference {
        let entry = entry.as_ref();
        let score = fuzz::weighted_ratio(&key, &normalize(entry));
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((entry, score));
            if score == 100 {
                break;
            }
        }
    }

    match best {
        Some((entry, score)) if score >= threshold => {
            let corrected = entry.to_lowercase() != candidate.to_lowercase();
            if corrected {
                debug!("Correction: '{}' -> '{}' (similarity {}%)", candidate, entry, score);
            }
            Correction {
                name: entry.to_string(),
                corrected,
                score,
            }
        }
        Some((entry, score)) => {
            warn!(
                "No match for '{}' (best attempt '{}' with {}%), keeping original",
                candidate, entry, score
            );
            Correction::unchanged(candidate, score)
        }
        None => {
            warn!("No reference names to match '{}' against, keeping original", candidate);
            Correction::unchanged(candidate, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_MATCH_THRESHOLD;

    #[test]
    fn normalize_strips_accents_case_and_whitespace() {
        assert_eq!(normalize("  São Paulo "), "sao paulo");
        assert_eq!(normalize("GOIÂNIA"), "goiania");
        assert_eq!(normalize("Conceição do Mato Dentro"), "conceicao do mato dentro");
    }

    #[test]
    fn normalize_is_idempotent() {
        for text in ["  Ribeirão Preto", "ÁGUAS LINDAS", "a \u{301}", "Ñandú ", "", "İstanbul"] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once, "input {text:?}");
        }
    }

    #[test]
    fn non_text_cells_have_empty_key() {
        assert_eq!(normalize_cell(&Cell::Number(3.0)), "");
        assert_eq!(normalize_cell(&Cell::Empty), "");
        assert_eq!(normalize_cell(&Cell::from("Pará")), "para");
    }

    #[test]
    fn accent_only_difference_is_corrected() {
        let reference = ["São Paulo", "Rio de Janeiro"];
        let result = correct_name("Sao Paulo", &reference, DEFAULT_MATCH_THRESHOLD);
        assert_eq!(result.name, "São Paulo");
        assert!(result.corrected);
    }

    #[test]
    fn case_only_difference_is_not_a_correction() {
        let result = correct_name("são paulo", &["São Paulo"], DEFAULT_MATCH_THRESHOLD);
        assert_eq!(result.name, "São Paulo");
        assert!(!result.corrected);
    }

    #[test]
    fn low_similarity_keeps_candidate() {
        let result = correct_name("Xyzzyx", &["São Paulo"], DEFAULT_MATCH_THRESHOLD);
        assert_eq!(result.name, "Xyzzyx");
        assert!(!result.corrected);
        assert!(result.score < DEFAULT_MATCH_THRESHOLD);
    }

    #[test]
    fn sentinel_and_blank_pass_through() {
        let reference = ["Indaiatuba"];
        assert_eq!(correct_name(UNDEFINED, &reference, 85).name, UNDEFINED);
        let blank = correct_name("   ", &reference, 85);
        assert_eq!(blank.name, "   ");
        assert!(!blank.corrected);
    }

    #[test]
    fn empty_reference_keeps_candidate() {
        let reference: [&str; 0] = [];
        let result = correct_name("Campinas", &reference, 85);
        assert_eq!(result.name, "Campinas");
        assert!(!result.corrected);
    }

    #[test]
    fn ties_resolve_to_first_entry() {
        // Both entries normalize to the same key.
        let reference = ["Bom Jesus", "BOM JESUS"];
        let result = correct_name("bom jesus", &reference, 85);
        assert_eq!(result.name, "Bom Jesus");

        let reversed = ["BOM JESUS", "Bom Jesus"];
        assert_eq!(correct_name("bom jesus", &reversed, 85).name, "BOM JESUS");
    }

    #[test]
    fn typo_resolves_to_canonical_spelling() {
        let reference = ["Belo Horizonte", "Betim", "Contagem"];
        let result = correct_name("Belo Horisonte", &reference, 85);
        assert_eq!(result.name, "Belo Horizonte");
        assert!(result.corrected);
    }
}
