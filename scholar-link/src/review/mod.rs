//! Human decision boundary
//!
//! Workflows escalate ambiguous cases through [`DecisionProvider`]. The
//! engine only relies on getting one of the enumerated choices back; how the
//! choice is made (terminal prompt, scripted answers, a ticket queue) is up
//! to the implementation.

mod scripted;
mod terminal;

pub use scripted::{DeferAll, ScriptedDecisions};
pub use terminal::TerminalReviewer;

use crate::types::{CandidateRecord, CleaningDecision, MatchResult, TimelineAnalysis};

/// Context for reviewing an uncertain identity match
#[derive(Debug, Clone, Copy)]
pub struct MatchReview<'a> {
    /// Search name of the roster entry
    pub person: &'a str,
    /// 1-based position within this review stage
    pub position: usize,
    pub total: usize,
    /// Selection result, including every scored candidate
    pub result: &'a MatchResult,
    /// Candidates in fetch order; `MatchChoice::Pick` indexes into this
    pub candidates: &'a [CandidateRecord],
}

/// Reviewer verdict on an identity match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchChoice {
    /// Accept the selected candidate
    Approve,
    /// No candidate is this person
    Reject,
    /// Use `candidates[index]` instead
    Pick(usize),
    /// No decision this run
    Skip,
    /// Stop reviewing the remaining matches
    Quit,
}

/// Context for an identifier conflict
#[derive(Debug, Clone, Copy)]
pub struct ConflictReview<'a> {
    pub person: &'a str,
    pub existing_id: &'a str,
    pub new_id: &'a str,
}

/// Reviewer verdict on an identifier conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    KeepExisting,
    KeepNew,
    Skip,
}

/// Context for reviewing a flagged publication timeline
#[derive(Debug, Clone, Copy)]
pub struct TimelineReview<'a> {
    pub person_id: &'a str,
    pub name: &'a str,
    pub recorded_year: Option<i32>,
    pub analysis: &'a TimelineAnalysis,
    pub decision: &'a CleaningDecision,
    /// Publication counts per year, ascending
    pub year_counts: &'a [(i32, usize)],
    pub position: usize,
    pub total: usize,
}

/// Reviewer verdict on a first-publication year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineChoice {
    /// Keep the recorded year
    Keep,
    /// Use the suggested year
    Suggested,
    /// Use a year entered by the reviewer
    Custom(i32),
    Skip,
    Quit,
}

/// Request to look up an author id by hand for an unmatched person
#[derive(Debug, Clone, Copy)]
pub struct LookupRequest<'a> {
    pub person: &'a str,
    pub position: usize,
    pub total: usize,
}

/// Reviewer answer to a manual lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupChoice {
    /// Author id as typed (validated by the workflow)
    Id(String),
    /// Confirmed: this person has no author record
    NoMatch,
    Skip,
    Quit,
}

/// Supplies human decisions for escalated cases
pub trait DecisionProvider {
    fn review_match(&mut self, review: &MatchReview<'_>) -> MatchChoice;

    fn resolve_conflict(&mut self, review: &ConflictReview<'_>) -> ConflictChoice;

    fn review_timeline(&mut self, review: &TimelineReview<'_>) -> TimelineChoice;

    fn manual_lookup(&mut self, request: &LookupRequest<'_>) -> LookupChoice;
}
