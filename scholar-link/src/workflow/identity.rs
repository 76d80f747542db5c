//! Identity resolution workflow
//!
//! Runs a roster through four stages:
//! 1. Selection: search name → candidates → [`MatchSelector::select`]
//! 2. Review: escalated matches go to the decision provider
//! 3. Conflicts: fresh ids are reconciled with recorded ids
//! 4. Manual lookup: persons still without an id are offered for lookup
//!
//! Per-entry failures become [`Rejection`]s; the rest of the roster continues.

use crate::error::Rejection;
use crate::identifiers::{normalize_authority_id, parse_manual_id};
use crate::matching::{
    roster_search_name, CandidateScorer, ConflictOutcome, ConflictResolver, IdComparison,
    MatchSelector,
};
use crate::review::{DecisionProvider, LookupChoice, LookupRequest, MatchChoice, MatchReview};
use crate::source::{candidates_or_empty, CandidateSource};
use crate::types::{CandidateRecord, Confidence, Identity, MatchResult};
use scholar_common::config::TomlConfig;
use scholar_common::Clock;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Where a person's final identifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdSource {
    /// Recorded identifier, unchanged or confirmed by the match
    Existing,
    /// Auto-approved match
    Matched,
    /// Match approved or picked by a reviewer
    Reviewed,
    /// Reviewer settled a conflict between recorded and fresh ids
    Conflict,
    /// Entered by hand during lookup
    Manual,
    /// No identifier
    Unresolved,
}

/// Final state of one roster entry
#[derive(Debug, Clone, Serialize)]
pub struct IdentityOutcome {
    /// Roster name as recorded
    pub person: String,
    pub search_name: String,
    /// Recorded identifier, normalized
    pub existing_id: Option<String>,
    pub resolved_id: Option<String>,
    pub source: IdSource,
    /// Reviewer confirmed there is no author record for this person
    pub confirmed_no_match: bool,
    /// Set when recorded and fresh ids disagreed
    pub conflict: Option<ConflictOutcome>,
    #[serde(rename = "match")]
    pub match_result: MatchResult,
}

/// Everything an identity run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct IdentityRun {
    pub outcomes: Vec<IdentityOutcome>,
    pub rejections: Vec<Rejection>,
    /// Matches escalated for review
    pub escalated: usize,
}

/// Working state for one roster entry between stages
struct Pending {
    identity_index: usize,
    search_name: String,
    candidates: Vec<CandidateRecord>,
    result: MatchResult,
    fresh: Option<(String, IdSource)>,
}

/// Drives the identity stages over a roster
pub struct IdentityWorkflow {
    selector: MatchSelector,
    resolver: ConflictResolver,
    institution_id: String,
}

impl IdentityWorkflow {
    pub fn new(config: &TomlConfig, clock: &dyn Clock) -> Self {
        let scorer = CandidateScorer::new(&config.institution_id, clock);
        Self::with_selector(
            MatchSelector::with_config(scorer, config.matching),
            &config.institution_id,
        )
    }

    pub fn with_selector(selector: MatchSelector, institution_id: &str) -> Self {
        Self {
            selector,
            resolver: ConflictResolver::new(),
            institution_id: institution_id.to_string(),
        }
    }

    /// Resolve every roster entry
    pub fn run(
        &self,
        roster: &[Identity],
        source: &dyn CandidateSource,
        provider: &mut dyn DecisionProvider,
    ) -> IdentityRun {
        let mut run = IdentityRun::default();

        let mut pending = self.select_all(roster, source, &mut run.rejections);
        run.escalated = self.review_matches(&mut pending, provider);

        let mut outcomes: Vec<IdentityOutcome> = pending
            .into_iter()
            .map(|entry| self.resolve_conflicts(&roster[entry.identity_index], entry, provider))
            .collect();

        self.manual_lookup(&mut outcomes, provider, &mut run.rejections);
        run.outcomes = outcomes;

        info!(
            total = roster.len(),
            resolved = run.outcomes.iter().filter(|o| o.resolved_id.is_some()).count(),
            escalated = run.escalated,
            rejected = run.rejections.len(),
            "Identity run complete"
        );
        run
    }

    fn select_all(
        &self,
        roster: &[Identity],
        source: &dyn CandidateSource,
        rejections: &mut Vec<Rejection>,
    ) -> Vec<Pending> {
        let mut pending = Vec::with_capacity(roster.len());

        for (identity_index, identity) in roster.iter().enumerate() {
            let search_name = roster_search_name(&identity.raw_name);
            let candidates = candidates_or_empty(source, &search_name, &self.institution_id);

            // An unusable name is not scored but keeps its recorded id
            let result = match self.selector.select(&search_name, &candidates) {
                Ok(result) => result,
                Err(e) => {
                    warn!(person = %identity.raw_name, error = %e, "Rejected roster entry");
                    rejections.push(Rejection::new(identity.raw_name.as_str(), &e));
                    pending.push(Pending {
                        identity_index,
                        search_name,
                        candidates: Vec::new(),
                        result: MatchResult::no_matches(),
                        fresh: None,
                    });
                    continue;
                }
            };

            let auto_approved = !result.needs_review()
                && matches!(result.confidence, Confidence::High | Confidence::Medium);
            let fresh = if auto_approved {
                result
                    .chosen_candidate_id
                    .clone()
                    .map(|id| (id, IdSource::Matched))
            } else {
                None
            };

            pending.push(Pending {
                identity_index,
                search_name,
                candidates,
                result,
                fresh,
            });
        }

        pending
    }

    /// Returns the number of escalated matches
    fn review_matches(&self, pending: &mut [Pending], provider: &mut dyn DecisionProvider) -> usize {
        let escalated: Vec<usize> = pending
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.result.needs_review())
            .map(|(i, _)| i)
            .collect();
        let total = escalated.len();

        for (position, &i) in escalated.iter().enumerate() {
            let entry = &mut pending[i];
            let review = MatchReview {
                person: &entry.search_name,
                position: position + 1,
                total,
                result: &entry.result,
                candidates: &entry.candidates,
            };

            let choice = provider.review_match(&review);
            debug!(person = %entry.search_name, choice = ?choice, "Match reviewed");

            match choice {
                MatchChoice::Approve => {
                    entry.fresh = entry
                        .result
                        .chosen_candidate_id
                        .clone()
                        .map(|id| (id, IdSource::Reviewed));
                }
                MatchChoice::Pick(index) => match entry.candidates.get(index) {
                    Some(candidate) => entry.fresh = Some((candidate.id.clone(), IdSource::Reviewed)),
                    None => warn!(person = %entry.search_name, index, "Pick out of range, skipping"),
                },
                MatchChoice::Reject | MatchChoice::Skip => {}
                MatchChoice::Quit => {
                    info!(reviewed = position, remaining = total - position, "Match review stopped");
                    break;
                }
            }
        }

        total
    }

    fn resolve_conflicts(
        &self,
        identity: &Identity,
        entry: Pending,
        provider: &mut dyn DecisionProvider,
    ) -> IdentityOutcome {
        let existing_id = identity.existing_id.as_deref().and_then(normalize_authority_id);
        let (fresh_id, fresh_source) = match &entry.fresh {
            Some((id, source)) => (normalize_authority_id(id), *source),
            None => (None, IdSource::Unresolved),
        };

        let resolution = self.resolver.resolve(
            &entry.search_name,
            existing_id.as_deref(),
            fresh_id.as_deref(),
            provider,
        );

        let (source, conflict) = match &resolution.comparison {
            IdComparison::NoIdentifier => (IdSource::Unresolved, None),
            IdComparison::OnlyExisting { .. } | IdComparison::Agreed { .. } => (IdSource::Existing, None),
            IdComparison::OnlyNew { .. } => (fresh_source, None),
            IdComparison::Conflict { .. } => (IdSource::Conflict, Some(resolution.outcome.clone())),
        };

        IdentityOutcome {
            person: identity.raw_name.clone(),
            search_name: entry.search_name,
            existing_id,
            resolved_id: resolution.resolved_id,
            source,
            confirmed_no_match: false,
            conflict,
            match_result: entry.result,
        }
    }

    fn manual_lookup(
        &self,
        outcomes: &mut [IdentityOutcome],
        provider: &mut dyn DecisionProvider,
        rejections: &mut Vec<Rejection>,
    ) {
        let unresolved: Vec<usize> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| o.resolved_id.is_none())
            .map(|(i, _)| i)
            .collect();
        let total = unresolved.len();

        for (position, &i) in unresolved.iter().enumerate() {
            let outcome = &mut outcomes[i];
            let request = LookupRequest {
                person: &outcome.search_name,
                position: position + 1,
                total,
            };

            match provider.manual_lookup(&request) {
                LookupChoice::Id(raw) => match parse_manual_id(&raw) {
                    Ok(id) => {
                        info!(person = %outcome.search_name, id = %id, "Manual identifier recorded");
                        outcome.resolved_id = Some(id);
                        outcome.source = IdSource::Manual;
                    }
                    Err(e) => {
                        warn!(person = %outcome.search_name, error = %e, "Ignoring manual identifier");
                        rejections.push(Rejection::new(outcome.person.as_str(), &e));
                    }
                },
                LookupChoice::NoMatch => outcome.confirmed_no_match = true,
                LookupChoice::Skip => {}
                LookupChoice::Quit => {
                    info!(remaining = total - position, "Manual lookup stopped");
                    break;
                }
            }
        }
    }
}
