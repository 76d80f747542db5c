//! Error types for scholar-link
//!
//! Every error here is scoped to a single roster entry or record. Workflows
//! collect them as [`Rejection`]s and keep processing the rest of the batch.

use serde::Serialize;
use thiserror::Error;

/// Per-record failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Name has no tokens left after normalization
    #[error("Name has no usable tokens: {0:?}")]
    EmptyName(String),

    /// Publication record without a year
    #[error("Publication for {person_id} has no year")]
    MissingYear { person_id: String },

    /// Roster entry has no identifier to join publications on
    #[error("No identifier recorded for {0}")]
    MissingIdentifier(String),

    /// Candidate lookup failed for a name
    #[error("Candidate lookup failed for {name}: {reason}")]
    LookupFailed { name: String, reason: String },

    /// Manually entered identifier does not look like an author id
    #[error("Invalid author identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Year outside the accepted range
    #[error("Year {year} outside accepted range {earliest}-{latest}")]
    YearOutOfRange { year: i32, earliest: i32, latest: i32 },
}

/// A record excluded from processing, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Roster name or person identifier the record belongs to
    pub subject: String,
    pub reason: String,
}

impl Rejection {
    pub fn new(subject: impl Into<String>, error: &RecordError) -> Self {
        Self {
            subject: subject.into(),
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_carries_error_message() {
        let err = RecordError::MissingYear {
            person_id: "A5000000001".to_string(),
        };
        let rejection = Rejection::new("A5000000001", &err);
        assert_eq!(rejection.subject, "A5000000001");
        assert_eq!(rejection.reason, "Publication for A5000000001 has no year");
    }

    #[test]
    fn test_year_out_of_range_message() {
        let err = RecordError::YearOutOfRange {
            year: 1850,
            earliest: 1900,
            latest: 2025,
        };
        assert_eq!(err.to_string(), "Year 1850 outside accepted range 1900-2025");
    }
}
