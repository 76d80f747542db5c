//! Authority identifier normalization
//!
//! Identifiers arrive in several shapes: full URLs from search responses
//! (`https://openalex.org/A5012345678`), bare ids, and hand-typed ids with
//! inconsistent case. Everything is compared in the bare, capitalized form.

use crate::error::RecordError;

const URL_PREFIXES: [&str; 2] = ["https://openalex.org/authors/", "https://openalex.org/"];

/// Author ids are `A` followed by ten characters
const AUTHOR_ID_LEN: usize = 11;

/// Strip URL prefixes and capitalize (first character upper, rest lower)
///
/// Returns `None` for blank input.
pub fn normalize_authority_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let bare = URL_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed)
        .trim_matches('/');

    let mut chars = bare.chars();
    let first = chars.next()?;
    let capitalized: String = first
        .to_uppercase()
        .chain(chars.flat_map(|c| c.to_lowercase()))
        .collect();
    Some(capitalized)
}

/// Validate a hand-entered author id (bare or URL form)
///
/// # Errors
/// Returns `RecordError::InvalidIdentifier` unless the id is `A` plus ten
/// characters.
pub fn parse_manual_id(input: &str) -> Result<String, RecordError> {
    let trimmed = input.trim();
    let candidate = if trimmed.starts_with("https://openalex.org/") {
        trimmed.rsplit('/').next().unwrap_or_default()
    } else {
        trimmed
    };

    if candidate.starts_with('A') && candidate.chars().count() == AUTHOR_ID_LEN {
        Ok(candidate.to_string())
    } else {
        Err(RecordError::InvalidIdentifier(input.to_string()))
    }
}
