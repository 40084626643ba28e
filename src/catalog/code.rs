//! Tariff code normalization and classification.
//!
//! Codes are written with separators (`0101.21.00.00`) but users type them
//! in every possible shape (`0101210000`, `0101.21`, `0101-21`). All code
//! comparisons therefore go through [`normalize`].

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ArancelError, Result};

/// Characters stripped from a code before comparison.
pub const SEPARATOR_CHARS: &[char] = &['.', '-', ' ', '/'];

/// Minimum number of significant digits of a valid subheading code.
pub const MIN_CODE_DIGITS: usize = 6;

/// Maximum number of significant digits of a valid subheading code.
pub const MAX_CODE_DIGITS: usize = 13;

lazy_static! {
    static ref NUMERIC_CODE: Regex = Regex::new(r"^[0-9.]+$").unwrap();
}

/// Remove every separator character from a code.
pub fn normalize(code: &str) -> String {
    code.trim()
        .chars()
        .filter(|c| !SEPARATOR_CHARS.contains(c))
        .collect()
}

/// Lookup key for a code: normalized and lowercased.
///
/// Descriptive pseudo-codes contain letters, so case folding keeps their
/// comparison case-insensitive like the rest of the catalog lookups.
pub fn code_key(code: &str) -> String {
    normalize(code).to_lowercase()
}

/// Two codes are equivalent if their normalized forms are equal or one is a
/// prefix of the other. Supports partial-code search.
pub fn codes_equivalent(a: &str, b: &str) -> bool {
    let a = code_key(a);
    let b = code_key(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.starts_with(&b) || b.starts_with(&a)
}

/// A code is descriptive when the row holds a title instead of a real code.
pub fn is_descriptive_code(code: &str) -> bool {
    let trimmed = code.trim();
    !trimmed.is_empty() && !NUMERIC_CODE.is_match(trimmed)
}

/// A query is code-shaped when it only holds digits and separators.
pub fn is_code_shaped(query: &str) -> bool {
    let trimmed = query.trim();
    trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || SEPARATOR_CHARS.contains(&c))
}

/// A query mentioning a code anywhere, such as `caballos 0101`.
pub fn mentions_code(query: &str) -> bool {
    query.chars().any(|c| c.is_ascii_digit())
}

/// Loose rule used by the scorer: contains a digit or is short.
pub fn looks_code_like(query: &str) -> bool {
    mentions_code(query) || query.chars().count() <= 10
}

/// Validate a subheading code and return its normalized form.
pub fn validate_code(code: &str) -> Result<String> {
    let trimmed = code.trim();
    if !NUMERIC_CODE.is_match(trimmed) {
        return Err(ArancelError::invalid_code(format!(
            "'{trimmed}' must contain only digits and dots"
        )));
    }

    let digits = normalize(trimmed);
    if !(MIN_CODE_DIGITS..=MAX_CODE_DIGITS).contains(&digits.len()) {
        return Err(ArancelError::invalid_code(format!(
            "'{trimmed}' must have between {MIN_CODE_DIGITS} and {MAX_CODE_DIGITS} digits"
        )));
    }

    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("0101.21.00.00"), "0101210000");
        assert_eq!(normalize(" 01-01 "), "0101");
        assert_eq!(normalize("0101/21"), "010121");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        for code in ["0101.21.00.00", "01.01", "84-71.30", "Los demás", "  ", "9."] {
            let once = normalize(code);
            assert_eq!(normalize(&once), once, "not idempotent for {code:?}");
        }
    }

    #[test]
    fn test_codes_equivalent() {
        assert!(codes_equivalent("0101.21.00.00", "0101210000"));
        assert!(codes_equivalent("0101.21", "0101.21.00.00"));
        assert!(codes_equivalent("0101210000", "0101.21"));
        assert!(!codes_equivalent("0102", "0101.21"));
        assert!(!codes_equivalent("", "0101"));
    }

    #[test]
    fn test_is_descriptive_code() {
        assert!(!is_descriptive_code("0101.21.00.00"));
        assert!(!is_descriptive_code("0101210000"));
        assert!(is_descriptive_code("- Caballos:"));
        assert!(is_descriptive_code("Los demás"));
        assert!(!is_descriptive_code(""));
        assert!(!is_descriptive_code("   "));
    }

    #[test]
    fn test_query_shapes() {
        assert!(is_code_shaped("0101.21"));
        assert!(is_code_shaped("999999"));
        assert!(!is_code_shaped("caballo"));
        assert!(!is_code_shaped("..."));
        assert!(!is_code_shaped("caballos 0101"));

        assert!(mentions_code("caballos 0101"));
        assert!(!mentions_code("caballos"));

        assert!(looks_code_like("caballo"));
        assert!(looks_code_like("animales vivos de 01"));
        assert!(!looks_code_like("animales vivos"));
    }

    #[test]
    fn test_validate_code() {
        assert_eq!(validate_code("0101.21.00.00").unwrap(), "0101210000");
        assert!(validate_code("0101").is_err());
        assert!(validate_code("0101.21.00.00.0000").is_err());
        assert!(validate_code("01A1.21").is_err());
    }
}
