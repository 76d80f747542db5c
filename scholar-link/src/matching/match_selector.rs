//! Match Selector
//!
//! Picks the best candidate for a roster name, assigns a confidence tier and
//! decides whether a human has to look at it.
//!
//! # Algorithm
//! 1. Score every candidate (malformed candidate names are skipped)
//! 2. Stable-sort by score, best first (ties keep fetch order)
//! 3. Flag `close_competitors` when the runner-up is within the margin
//! 4. Tier the top score: `> high` → high, `> medium` → medium, else low

use crate::error::RecordError;
use crate::matching::candidate_scorer::CandidateScorer;
use crate::matching::name_normalizer::extract_name_parts;
use crate::types::{CandidateRecord, Confidence, MatchFlag, MatchResult, ScoredCandidate};
use scholar_common::config::MatchingConfig;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Candidate selection for one identity at a time
#[derive(Debug, Clone)]
pub struct MatchSelector {
    scorer: CandidateScorer,
    config: MatchingConfig,
}

impl MatchSelector {
    pub fn new(scorer: CandidateScorer) -> Self {
        Self::with_config(scorer, MatchingConfig::default())
    }

    pub fn with_config(scorer: CandidateScorer, config: MatchingConfig) -> Self {
        Self { scorer, config }
    }

    pub fn scorer(&self) -> &CandidateScorer {
        &self.scorer
    }

    /// Select the best candidate for `identity_name`
    ///
    /// Pure: the same name and candidate sequence always yield the same result.
    ///
    /// # Errors
    /// Returns `RecordError::EmptyName` if `identity_name` has no usable tokens.
    pub fn select(
        &self,
        identity_name: &str,
        candidates: &[CandidateRecord],
    ) -> Result<MatchResult, RecordError> {
        extract_name_parts(identity_name)?;

        let mut ranked: Vec<ScoredCandidate> = candidates
            .iter()
            .enumerate()
            .filter_map(|(input_index, candidate)| {
                match self.scorer.score(identity_name, candidate) {
                    Ok(scored) => Some(ScoredCandidate {
                        input_index,
                        candidate_id: candidate.id.clone(),
                        display_name: candidate.display_name.clone(),
                        name_similarity: scored.name_similarity,
                        score: scored.score,
                        flags: scored.flags,
                    }),
                    Err(e) => {
                        warn!(
                            identity = %identity_name,
                            candidate = %candidate.id,
                            error = %e,
                            "Skipping candidate with malformed name"
                        );
                        None
                    }
                }
            })
            .collect();

        if ranked.is_empty() {
            debug!(identity = %identity_name, "No candidates to select from");
            return Ok(MatchResult::no_matches());
        }

        // Vec::sort_by is stable: equal scores keep fetch order
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let best = &ranked[0];
        let mut flags = best.flags.clone();
        if let Some(runner_up) = ranked.get(1) {
            if best.score - runner_up.score < self.config.close_competitor_margin {
                flags.push(MatchFlag::CloseCompetitors);
            }
        }

        let confidence = self.tier(best.score);
        let result = MatchResult {
            chosen_candidate_id: Some(best.candidate_id.clone()),
            confidence,
            flags,
            ranked,
        };

        debug!(
            identity = %identity_name,
            chosen = ?result.chosen_candidate_id,
            confidence = %result.confidence,
            candidates = result.ranked.len(),
            needs_review = result.needs_review(),
            "Selected candidate"
        );

        Ok(result)
    }

    /// Confidence tier for a top score
    pub fn tier(&self, score: f64) -> Confidence {
        if score > self.config.high_threshold {
            Confidence::High
        } else if score > self.config.medium_threshold {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}
