use crate::constants::*;
use crate::normalize::normalize;
use tracing::warn;

/// Keyword rule: every `all` keyword and at least one `any` keyword (if given) must appear.
struct LawRule {
    all: &'static [&'static str],
    any: &'static [&'static str],
    canonical: &'static str,
}

const fn rule(
    all: &'static [&'static str],
    any: &'static [&'static str],
    canonical: &'static str,
) -> LawRule {
    LawRule { all, any, canonical }
}

// Evaluated top to bottom; multi-keyword rules sit above their subsets.
static LAW_RULES: &[LawRule] = &[
    rule(&[], &["FIA", "INFANCIA"], LAW_FIA),
    rule(&[], &["IDOSO"], LAW_ELDERLY),
    rule(&["ICMS", "RJ", "ESPORTE"], &[], LAW_ICMS_RJ_SPORT),
    rule(&["ICMS", "RJ", "CULTURA"], &[], LAW_ICMS_RJ_CULTURE),
    rule(&["ICMS", "RJ"], &[], LAW_ICMS_RJ),
    rule(&["ICMS", "MG", "ESPORTE"], &[], LAW_ICMS_MG_SPORT),
    rule(&["ICMS", "MG", "CULTURA"], &[], LAW_ICMS_MG_CULTURE),
    rule(&["ICMS", "MG"], &[], LAW_ICMS_MG),
    rule(&[], &["PROAC"], LAW_PROAC),
    rule(&[], &["PROMAC"], LAW_PROMAC),
    rule(&[], &["PRONAS"], LAW_PRONAS),
    rule(&[], &["PRONON"], LAW_PRONON),
    rule(&[], &["PIE"], LAW_PIE),
    rule(&[], &["ESPORTE", "LIE"], LAW_SPORT),
    rule(&[], &["ROUANET", "CULTURA"], LAW_CULTURE),
];

impl LawRule {
    fn matches(&self, haystack: &str) -> bool {
        self.all.iter().all(|k| haystack.contains(k))
            && (self.any.is_empty() || self.any.iter().any(|k| haystack.contains(k)))
    }
}

/// Maps a free-text law label onto the canonical law name.
///
/// Matching is case- and accent-insensitive. Unknown labels come back unchanged.
pub fn map_law(text: &str) -> String {
    let haystack = normalize(text).to_uppercase();
    match LAW_RULES.iter().find(|r| r.matches(&haystack)) {
        Some(rule) => rule.canonical.to_string(),
        None => {
            warn!("Law '{}' has no mapping, keeping original name", text);
            text.to_string()
        }
    }
}
