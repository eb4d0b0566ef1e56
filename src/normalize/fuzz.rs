//! Token-based string similarity on a 0-100 scale.
//!
//! `weighted_ratio` picks the best of a plain edit ratio and several token
//! views (sorted tokens, token sets, best-aligned substrings), scaling the
//! looser views down so an exact match always outranks a partial one.

use std::collections::BTreeSet;

const UNBASE_SCALE: f64 = 0.95;
const PARTIAL_LEN_RATIO: f64 = 1.5;

/// Lowercases and replaces everything that is not alphanumeric with a space.
pub fn default_process(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.to_lowercase().trim().to_string()
}

/// Indel similarity: `2 * lcs / (len_a + len_b)`, scaled to 0-100.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(a, b) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Best ratio of the shorter string against every same-length window of the longer.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let mut best = 0.0f64;
    for start in 0..=(long.len() - short.len()) {
        let score = ratio_chars(&short, &long[start..start + short.len()]);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn partial_token_sort_ratio(a: &str, b: &str) -> f64 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

struct TokenSplit {
    intersection: String,
    only_a: String,
    only_b: String,
}

fn split_tokens(a: &str, b: &str) -> TokenSplit {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();
    let join = |tokens: Vec<&str>| tokens.join(" ");
    TokenSplit {
        intersection: join(set_a.intersection(&set_b).copied().collect()),
        only_a: join(set_a.difference(&set_b).copied().collect()),
        only_b: join(set_b.difference(&set_a).copied().collect()),
    }
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let split = split_tokens(a, b);
    if split.intersection.is_empty() && (split.only_a.is_empty() || split.only_b.is_empty()) {
        return 0.0;
    }
    if !split.intersection.is_empty() && (split.only_a.is_empty() || split.only_b.is_empty()) {
        return 100.0;
    }

    let combine = |rest: &str| {
        if split.intersection.is_empty() {
            rest.to_string()
        } else {
            format!("{} {}", split.intersection, rest)
        }
    };
    let combined_a = combine(&split.only_a);
    let combined_b = combine(&split.only_b);

    let mut best = ratio(&combined_a, &combined_b);
    if !split.intersection.is_empty() {
        best = best
            .max(ratio(&split.intersection, &combined_a))
            .max(ratio(&split.intersection, &combined_b));
    }
    best
}

fn partial_token_set_ratio(a: &str, b: &str) -> f64 {
    let split = split_tokens(a, b);
    if split.intersection.is_empty() && (split.only_a.is_empty() || split.only_b.is_empty()) {
        return 0.0;
    }
    if !split.intersection.is_empty() {
        return 100.0;
    }
    partial_ratio(&split.only_a, &split.only_b)
}

/// Weighted similarity of two strings, 0-100. Empty inputs score 0.
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let a = default_process(a);
    let b = default_process(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let base = ratio(&a, &b);
    let (len_a, len_b) = (a.chars().count() as f64, b.chars().count() as f64);
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    let best = if len_ratio < PARTIAL_LEN_RATIO {
        base.max(token_sort_ratio(&a, &b) * UNBASE_SCALE)
            .max(token_set_ratio(&a, &b) * UNBASE_SCALE)
    } else {
        let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
        base.max(partial_ratio(&a, &b) * partial_scale)
            .max(partial_token_sort_ratio(&a, &b) * UNBASE_SCALE * partial_scale)
            .max(partial_token_set_ratio(&a, &b) * UNBASE_SCALE * partial_scale)
    };

    best.round().clamp(0.0, 100.0) as u8
}
