//! Candidate supply
//!
//! The engine never talks to the authority directly. A [`CandidateSource`]
//! hands it the candidate set for a search name; a failed lookup is reported
//! per name and the batch continues with an empty set.

use crate::error::RecordError;
use crate::types::CandidateRecord;
use scholar_common::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Supplies candidate author records for a search name
pub trait CandidateSource {
    fn fetch_candidates(
        &self,
        name: &str,
        institution_id: &str,
    ) -> std::result::Result<Vec<CandidateRecord>, RecordError>;
}

/// Fetch candidates, treating a failed lookup as an empty set
pub fn candidates_or_empty(
    source: &dyn CandidateSource,
    name: &str,
    institution_id: &str,
) -> Vec<CandidateRecord> {
    match source.fetch_candidates(name, institution_id) {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(name = %name, error = %e, "Candidate lookup failed, continuing with no candidates");
            Vec::new()
        }
    }
}

/// Persisted search results keyed by search name
///
/// JSON shape: `{"First Last": [candidate, ...] | null}`. A `null` entry
/// records a search that failed when the cache was built.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SearchCache {
    entries: HashMap<String, Option<Vec<CandidateRecord>>>,
}

impl SearchCache {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let cache = Self::from_json_str(&content)?;
        debug!(path = %path.display(), entries = cache.len(), "Loaded search cache");
        Ok(cache)
    }

    pub fn insert(&mut self, name: impl Into<String>, candidates: Option<Vec<CandidateRecord>>) {
        self.entries.insert(name.into(), candidates);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CandidateSource for SearchCache {
    fn fetch_candidates(
        &self,
        name: &str,
        _institution_id: &str,
    ) -> std::result::Result<Vec<CandidateRecord>, RecordError> {
        match self.entries.get(name) {
            Some(Some(candidates)) => Ok(candidates.clone()),
            Some(None) => Err(RecordError::LookupFailed {
                name: name.to_string(),
                reason: "search failed when cached".to_string(),
            }),
            None => Err(RecordError::LookupFailed {
                name: name.to_string(),
                reason: "not in search cache".to_string(),
            }),
        }
    }
}
