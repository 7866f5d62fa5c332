//! Parsing of human-readable counts as rendered by the hosting platform.
//!
//! Counts come in several shapes: plain integers (`"42"`), thousands-separated
//! integers (`"237,800"`), and abbreviated values with a unit letter (`"1.2k"`,
//! `"3M"`). A decimal point without a unit letter is read as thousands
//! (`"237.8"` is `237_800`), matching how the platform abbreviates large counts
//! in some views.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Digits, separators and periods, optionally followed by one non-period character (the unit letter).
static SUFFIXED_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9,.]+[^.]?").expect("valid regex"));

/// Multiplier applied to a decimal value that carries no unit letter.
const IMPLICIT_DECIMAL_UNIT: i64 = 1000;

/// Text that could not be read as a count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to parse '{text}' as a count")]
pub struct ParseError {
    text: String,
}

impl ParseError {
    fn new(text: &str) -> Self {
        Self { text: text.to_string() }
    }
}

/// Parse a count such as `"1.2k"`, `"237,800"`, or `"3M"`.
///
/// Thousands separators are removed first. A trailing `k` multiplies by one
/// thousand and a trailing `m` by one million, case-insensitively. When no unit
/// letter is present but a decimal point remains, the value is scaled by one
/// thousand. Fractional digits beyond the unit's precision are truncated.
pub fn parse_suffixed_number(text: &str) -> Result<i64, ParseError> {
    let cleaned = text.trim().replace(',', "").to_lowercase();

    if cleaned.is_empty() {
        return Err(ParseError::new(text));
    }

    let (number, multiplier) = if let Some(thousands) = cleaned.strip_suffix('k') {
        (thousands, 1_000)
    } else if let Some(millions) = cleaned.strip_suffix('m') {
        (millions, 1_000_000)
    } else if cleaned.contains('.') {
        (cleaned.as_str(), IMPLICIT_DECIMAL_UNIT)
    } else {
        (cleaned.as_str(), 1)
    };

    scale_decimal(number.trim_end(), multiplier).ok_or_else(|| ParseError::new(text))
}

/// Find the first count inside a larger piece of text and parse it.
///
/// The first run of digits, commas, and periods is taken together with at most
/// one following non-period character so that a unit letter is captured.
pub fn find_suffixed_number(text: &str) -> Result<i64, ParseError> {
    let found = SUFFIXED_NUMBER.find(text).ok_or_else(|| ParseError::new(text))?;
    parse_suffixed_number(found.as_str())
}

/// Multiply a decimal string by `multiplier` using integer arithmetic only.
fn scale_decimal(number: &str, multiplier: i64) -> Option<i64> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole_value = if whole.is_empty() { 0 } else { whole.parse::<i64>().ok()? };
    let mut total = whole_value.checked_mul(multiplier)?;

    let mut place = multiplier;
    for digit in fraction.bytes() {
        place /= 10;
        if place == 0 {
            break;
        }
        total = total.checked_add(i64::from(digit - b'0') * place)?;
    }

    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_integer() {
        assert_eq!(parse_suffixed_number("42").unwrap(), 42);
        assert_eq!(parse_suffixed_number("  7 \n").unwrap(), 7);
    }

    #[test]
    fn test_parse_thousands_separator() {
        assert_eq!(parse_suffixed_number("237,800").unwrap(), 237_800);
        assert_eq!(parse_suffixed_number("1,234,567").unwrap(), 1_234_567);
    }

    #[test]
    fn test_parse_unit_suffixes() {
        assert_eq!(parse_suffixed_number("1.2k").unwrap(), 1200);
        assert_eq!(parse_suffixed_number("1.2K").unwrap(), 1200);
        assert_eq!(parse_suffixed_number("15k").unwrap(), 15_000);
        assert_eq!(parse_suffixed_number("3M").unwrap(), 3_000_000);
        assert_eq!(parse_suffixed_number("2.75m").unwrap(), 2_750_000);
    }

    #[test]
    fn test_parse_decimal_without_unit_is_thousands() {
        assert_eq!(parse_suffixed_number("237.8").unwrap(), 237_800);
        assert_eq!(parse_suffixed_number("1.5").unwrap(), 1500);
    }

    #[test]
    fn test_parse_truncates_excess_precision() {
        assert_eq!(parse_suffixed_number("1.23456k").unwrap(), 1234);
    }

    #[test]
    fn test_parse_whole_thousands_round_trip() {
        for n in (0..200_000_i64).step_by(1000) {
            let text = format!("{}k", n / 1000);
            assert_eq!(parse_suffixed_number(&text).unwrap(), n, "input {text}");
        }

        for n in (0..50_000_i64).step_by(100) {
            #[expect(clippy::cast_precision_loss, reason = "test values are small")]
            let text = format!("{}k", n as f64 / 1000.0);
            assert_eq!(parse_suffixed_number(&text).unwrap(), n, "input {text}");
        }
    }

    #[test]
    fn test_parse_unit_after_space_or_non_ascii() {
        assert_eq!(parse_suffixed_number("2.5 k").unwrap(), 2500);
        assert_eq!(parse_suffixed_number(" 7M ").unwrap(), 7_000_000);
        assert!(parse_suffixed_number("1.2€").is_err());
        assert!(parse_suffixed_number("ék").is_err());
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!(parse_suffixed_number("").is_err());
        assert!(parse_suffixed_number("k").is_err());
        assert!(parse_suffixed_number("abc").is_err());
        assert!(parse_suffixed_number("12 stars").is_err());
        assert!(parse_suffixed_number("1.2.3k").is_err());

        let err = parse_suffixed_number("many").unwrap_err();
        assert_eq!(err.to_string(), "unable to parse 'many' as a count");
    }

    #[test]
    fn test_find_in_prose() {
        assert_eq!(find_suffixed_number("1.2k followers").unwrap(), 1200);
        assert_eq!(find_suffixed_number("Here are 4,321 public repositories").unwrap(), 4321);
        assert_eq!(find_suffixed_number("\n   1,234 contributions in the last year").unwrap(), 1234);
        assert_eq!(find_suffixed_number("Open 56").unwrap(), 56);
        assert_eq!(find_suffixed_number("98 stars today").unwrap(), 98);
    }

    #[test]
    fn test_find_without_digits_fails() {
        assert!(find_suffixed_number("no numbers here").is_err());
        assert!(find_suffixed_number("").is_err());
    }
}
