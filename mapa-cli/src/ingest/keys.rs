//! Product key normalization shared by the launch map and reference tables

use once_cell::sync::Lazy;
use regex::Regex;

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").expect("valid regex"));

/// Strip every non-digit character from a product code.
///
/// An empty result means the code was not informed and must never be used
/// as a join key.
pub fn normalize_code(raw: &str) -> String {
    NON_DIGIT.replace_all(raw, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("789-1234 567.890"), "7891234567890");
        assert_eq!(normalize_code("  "), "");
        assert_eq!(normalize_code("abc"), "");
        assert_eq!(normalize_code("0012"), "0012");
    }

    #[test]
    fn test_normalize_code_idempotent() {
        for raw in ["7891234567890", "78.91-23", "EAN: 111", ""] {
            let once = normalize_code(raw);
            assert_eq!(normalize_code(&once), once);
            assert!(once.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
