//! Run statistics
//!
//! One [`RunReport`] per run, built from the run's outcomes. Maps are
//! `BTreeMap`s so serialized reports are stable.

use crate::error::Rejection;
use crate::workflow::{IdentityRun, TimelineRun};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

/// Summary of one identity or cleaning run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// "match" or "clean_years"
    pub kind: &'static str,
    pub total: usize,
    /// Persons ending the run with an identifier (identity runs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_id: Option<usize>,
    /// `with_id` as a percentage of `total`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_rate: Option<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub confidence_counts: BTreeMap<String, usize>,
    /// Cases escalated for review
    pub review_count: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub recommendation_counts: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub action_counts: BTreeMap<String, usize>,
    /// Human corrections recorded (cleaning runs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrections: Option<usize>,
    pub rejections: Vec<Rejection>,
}

fn tally<I: IntoIterator<Item = String>>(labels: I) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

impl RunReport {
    pub fn for_identity(run: &IdentityRun) -> Self {
        let total = run.outcomes.len();
        let with_id = run
            .outcomes
            .iter()
            .filter(|o| o.resolved_id.is_some())
            .count();

        Self {
            run_id: Uuid::new_v4(),
            kind: "match",
            total,
            with_id: Some(with_id),
            match_rate: Some(percentage(with_id, total)),
            confidence_counts: tally(
                run.outcomes
                    .iter()
                    .map(|o| o.match_result.confidence.to_string()),
            ),
            review_count: run.escalated,
            recommendation_counts: BTreeMap::new(),
            action_counts: BTreeMap::new(),
            corrections: None,
            rejections: run.rejections.clone(),
        }
    }

    pub fn for_timeline(run: &TimelineRun) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            kind: "clean_years",
            total: run.outcomes.len(),
            with_id: None,
            match_rate: None,
            confidence_counts: BTreeMap::new(),
            review_count: run.escalated,
            recommendation_counts: tally(
                run.outcomes
                    .iter()
                    .map(|o| o.analysis.recommendation.to_string()),
            ),
            action_counts: tally(run.outcomes.iter().map(|o| o.decision.action.to_string())),
            corrections: Some(run.corrections.len()),
            rejections: run.rejections.clone(),
        }
    }

    /// Log the summary at info level
    pub fn log(&self) {
        info!(
            run_id = %self.run_id,
            kind = self.kind,
            total = self.total,
            review_count = self.review_count,
            rejected = self.rejections.len(),
            "Run summary"
        );
        if let (Some(with_id), Some(rate)) = (self.with_id, self.match_rate) {
            info!(with_id, total = self.total, "Match rate: {:.1}%", rate);
        }
        for (tier, count) in &self.confidence_counts {
            info!(confidence = %tier, count, "Confidence tier");
        }
        for (recommendation, count) in &self.recommendation_counts {
            info!(recommendation = %recommendation, count, "Recommendation");
        }
        for (action, count) in &self.action_counts {
            info!(action = %action, count, "Cleaning action");
        }
    }
}
