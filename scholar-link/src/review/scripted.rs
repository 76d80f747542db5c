//! Non-interactive decision providers

use super::{
    ConflictChoice, ConflictReview, DecisionProvider, LookupChoice, LookupRequest, MatchChoice,
    MatchReview, TimelineChoice, TimelineReview,
};
use std::collections::VecDeque;

/// Defers every decision
///
/// Used for unattended runs: everything escalated stays undecided.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferAll;

impl DecisionProvider for DeferAll {
    fn review_match(&mut self, _review: &MatchReview<'_>) -> MatchChoice {
        MatchChoice::Skip
    }

    fn resolve_conflict(&mut self, _review: &ConflictReview<'_>) -> ConflictChoice {
        ConflictChoice::Skip
    }

    fn review_timeline(&mut self, _review: &TimelineReview<'_>) -> TimelineChoice {
        TimelineChoice::Skip
    }

    fn manual_lookup(&mut self, _request: &LookupRequest<'_>) -> LookupChoice {
        LookupChoice::Skip
    }
}

/// Replays queued answers in order, one queue per decision type
///
/// An exhausted queue answers `Skip`. Every request is recorded so tests can
/// check what was escalated.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisions {
    matches: VecDeque<MatchChoice>,
    conflicts: VecDeque<ConflictChoice>,
    timelines: VecDeque<TimelineChoice>,
    lookups: VecDeque<LookupChoice>,
    /// Person names/ids seen, in request order
    pub asked: Vec<String>,
}

impl ScriptedDecisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matched(mut self, choice: MatchChoice) -> Self {
        self.matches.push_back(choice);
        self
    }

    pub fn conflict(mut self, choice: ConflictChoice) -> Self {
        self.conflicts.push_back(choice);
        self
    }

    pub fn timeline(mut self, choice: TimelineChoice) -> Self {
        self.timelines.push_back(choice);
        self
    }

    pub fn lookup(mut self, choice: LookupChoice) -> Self {
        self.lookups.push_back(choice);
        self
    }

    /// Answers not yet consumed
    pub fn remaining(&self) -> usize {
        self.matches.len() + self.conflicts.len() + self.timelines.len() + self.lookups.len()
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn review_match(&mut self, review: &MatchReview<'_>) -> MatchChoice {
        self.asked.push(review.person.to_string());
        self.matches.pop_front().unwrap_or(MatchChoice::Skip)
    }

    fn resolve_conflict(&mut self, review: &ConflictReview<'_>) -> ConflictChoice {
        self.asked.push(review.person.to_string());
        self.conflicts.pop_front().unwrap_or(ConflictChoice::Skip)
    }

    fn review_timeline(&mut self, review: &TimelineReview<'_>) -> TimelineChoice {
        self.asked.push(review.person_id.to_string());
        self.timelines.pop_front().unwrap_or(TimelineChoice::Skip)
    }

    fn manual_lookup(&mut self, request: &LookupRequest<'_>) -> LookupChoice {
        self.asked.push(request.person.to_string());
        self.lookups.pop_front().unwrap_or(LookupChoice::Skip)
    }
}
