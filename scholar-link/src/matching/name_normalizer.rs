//! Name normalization
//!
//! Strips honorifics and suffixes, removes punctuation, collapses whitespace
//! and lowercases. Normalization is total: any input, including the empty
//! string, yields a (possibly empty) normalized string.

use crate::error::RecordError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Titles and suffixes removed before comparison (whole words, any case)
static HONORIFICS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(Dr|Prof|Professor|PhD|MD|Jr|Sr|II|III|IV)\b\.?")
        .expect("honorific pattern is valid")
});

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"));

/// Tokenized name: first, middle tokens, last
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameParts {
    pub first: String,
    pub middle: Vec<String>,
    /// Empty for single-token names
    pub last: String,
}

/// Normalize a raw name for comparison
///
/// `"Dr. John A. Smith, Jr."` → `"john a smith"`
pub fn normalize_name(name: &str) -> String {
    let without_titles = HONORIFICS.replace_all(name, "");
    let without_punctuation = NON_WORD.replace_all(&without_titles, "");
    without_punctuation
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split a name into (first, middle, last)
///
/// - one token → `(token, [], "")`
/// - two tokens → `(tok0, [], tok1)`
/// - three or more → `(first, middle..., last)`
///
/// # Errors
/// Returns `RecordError::EmptyName` when normalization leaves no tokens.
pub fn extract_name_parts(name: &str) -> Result<NameParts, RecordError> {
    let normalized = normalize_name(name);
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    match tokens.as_slice() {
        [] => Err(RecordError::EmptyName(name.to_string())),
        [only] => Ok(NameParts {
            first: (*only).to_string(),
            middle: Vec::new(),
            last: String::new(),
        }),
        [first, last] => Ok(NameParts {
            first: (*first).to_string(),
            middle: Vec::new(),
            last: (*last).to_string(),
        }),
        [first, middle @ .., last] => Ok(NameParts {
            first: (*first).to_string(),
            middle: middle.iter().map(|s| (*s).to_string()).collect(),
            last: (*last).to_string(),
        }),
    }
}

/// Convert a roster name to search form
///
/// Roster names are recorded as `"Last, First Middle"`; the authority search
/// expects `"First Middle Last"`. Names without exactly one comma are
/// returned trimmed.
pub fn roster_search_name(payroll_name: &str) -> String {
    let parts: Vec<&str> = payroll_name.split(',').collect();
    match parts.as_slice() {
        [last, first] => format!("{} {}", first.trim(), last.trim()).trim().to_string(),
        _ => payroll_name.trim().to_string(),
    }
}
