use crate::types::Cell;
use once_cell::sync::Lazy;
use regex::Regex;

static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d.,]+").expect("valid amount pattern"));

/// Coerces a cell into a monetary amount. Never fails; anything unusable is 0.0.
pub fn to_float(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) => *n,
        Cell::Text(text) => parse_amount(text),
        Cell::Empty | Cell::Bool(_) => 0.0,
    }
}

/// Parses amounts such as `"R$ 1.234,56"` or `"1.234.567"`.
///
/// With a comma present, dots are thousands separators and the comma is the
/// decimal mark. Without one, several dots are thousands separators. A single
/// dot and no comma is read as a decimal point, so `"1.234"` is 1.234.
pub fn parse_amount(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }
    let Some(found) = AMOUNT_RE.find(text) else {
        return 0.0;
    };

    let digits = found.as_str();
    let cleaned = if digits.contains(',') {
        digits.replace('.', "").replace(',', ".")
    } else if digits.matches('.').count() > 1 {
        digits.replace('.', "")
    } else {
        digits.to_string()
    };

    cleaned.parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brazilian_currency_format() {
        assert_eq!(parse_amount("R$ 1.234,56"), 1234.56);
        assert_eq!(parse_amount("R$ 50.000,00 (aprovado)"), 50000.0);
        assert_eq!(parse_amount("300,5"), 300.5);
    }

    #[test]
    fn multiple_dots_are_thousands_separators() {
        assert_eq!(parse_amount("1.234.567"), 1234567.0);
    }

    #[test]
    fn single_dot_without_comma_is_decimal() {
        // Ambiguous: could also mean one thousand two hundred thirty-four.
        assert_eq!(parse_amount("1.234"), 1.234);
    }

    #[test]
    fn empty_and_garbage_are_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("   "), 0.0);
        assert_eq!(parse_amount("a definir"), 0.0);
        assert_eq!(parse_amount("..."), 0.0);
        assert_eq!(parse_amount(",,"), 0.0);
    }

    #[test]
    fn only_first_numeric_run_is_used() {
        assert_eq!(parse_amount("100 mil / 200 mil"), 100.0);
    }

    #[test]
    fn cells_of_every_shape() {
        assert_eq!(to_float(&Cell::Number(42.0)), 42.0);
        assert_eq!(to_float(&Cell::Empty), 0.0);
        assert_eq!(to_float(&Cell::Bool(true)), 0.0);
        assert_eq!(to_float(&Cell::from("R$ 2.500,00")), 2500.0);
    }
}
