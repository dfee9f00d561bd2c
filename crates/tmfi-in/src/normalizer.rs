//! Name normalization for reconciliation.
//!
//! Declared names arrive with arbitrary case, spacing and punctuation:
//! - Lowercase conversion
//! - Whitespace normalization
//! - Word splitting on anything that is not a letter or digit

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Multiple whitespace pattern
    static ref MULTI_SPACE: Regex = Regex::new(r"\s+").unwrap();

    /// A run of letters or digits
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}]+").unwrap();
}

/// Lowercase, trim and collapse internal whitespace
pub fn normalize_name(name: &str) -> String {
    MULTI_SPACE
        .replace_all(name.trim(), " ")
        .to_lowercase()
}

/// Lowercased words of a name, punctuation dropped
pub fn words(name: &str) -> Vec<String> {
    WORD.find_iter(&name.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Whether `needle` occurs as a contiguous run of whole words in `haystack`
pub fn contains_words(haystack: &[String], needle: &[String]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}
