//! Cleaning Decision Maker
//!
//! Turns a timeline analysis into an automatic action on the recorded
//! first-publication year. Low-confidence analyses never change anything.

use crate::types::{CleaningAction, CleaningDecision, Recommendation, TimelineAnalysis};

/// Default confidence required before acting on an analysis
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

/// Applies the confidence threshold and recommendation mapping
#[derive(Debug, Clone, Copy)]
pub struct CleaningDecisionMaker {
    min_confidence: f64,
}

impl Default for CleaningDecisionMaker {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONFIDENCE)
    }
}

impl CleaningDecisionMaker {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Decide what happens to `recorded_year`
    ///
    /// Below the threshold, and for any recommendation that does not call
    /// for action, the recorded year is kept as-is.
    pub fn decide(&self, analysis: &TimelineAnalysis, recorded_year: Option<i32>) -> CleaningDecision {
        let keep = CleaningDecision {
            action: CleaningAction::KeepOriginal,
            final_year: recorded_year,
        };

        if analysis.confidence < self.min_confidence {
            return keep;
        }

        match analysis.recommendation {
            Recommendation::LikelyFalsePositiveEarly | Recommendation::IsolatedEarlyOutlier => {
                match analysis.suggested_first_year {
                    Some(year) => CleaningDecision {
                        action: CleaningAction::CleanToSuggested,
                        final_year: Some(year),
                    },
                    None => keep,
                }
            }
            Recommendation::SuspiciouslyLongCareer | Recommendation::MultipleLargeGaps => {
                CleaningDecision {
                    action: CleaningAction::FlagForManualReview,
                    final_year: None,
                }
            }
            Recommendation::AppearsReasonable
            | Recommendation::InsufficientData
            | Recommendation::NoPapersFound => keep,
        }
    }
}
