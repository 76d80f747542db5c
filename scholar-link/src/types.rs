//! Core data model for identity resolution and timeline cleaning
//!
//! Inputs (`Identity`, `CandidateRecord`, `PublicationRecord`) are read-only.
//! Everything else is derived by pure functions of those inputs.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identity Resolution
// ============================================================================

/// A roster entry to be resolved against the author authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Name as recorded on the roster ("Last, First" or "First [Middle...] Last")
    pub raw_name: String,
    /// Previously recorded authority identifier
    #[serde(default)]
    pub existing_id: Option<String>,
    /// Roster year used as the career-span reference point
    #[serde(default)]
    pub payroll_year: Option<i32>,
    /// Recorded first-publication year
    #[serde(default)]
    pub first_pub_year: Option<i32>,
}

impl Identity {
    pub fn new(raw_name: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
            existing_id: None,
            payroll_year: None,
            first_pub_year: None,
        }
    }

    pub fn with_existing_id(mut self, id: impl Into<String>) -> Self {
        self.existing_id = Some(id.into());
        self
    }

    pub fn with_payroll_year(mut self, year: i32) -> Self {
        self.payroll_year = Some(year);
        self
    }

    pub fn with_first_pub_year(mut self, year: i32) -> Self {
        self.first_pub_year = Some(year);
        self
    }
}

/// Institution reference inside an affiliation period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Years an author was affiliated with one institution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliationPeriod {
    pub institution: Institution,
    #[serde(default)]
    pub years: Vec<i32>,
}

impl AffiliationPeriod {
    pub fn new(institution_id: impl Into<String>, years: Vec<i32>) -> Self {
        Self {
            institution: Institution {
                id: institution_id.into(),
                display_name: None,
            },
            years,
        }
    }
}

/// One author record returned by the authority search
///
/// Field names follow the authority's JSON so cached search responses
/// deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "affiliations")]
    pub affiliation_periods: Vec<AffiliationPeriod>,
    #[serde(default)]
    pub works_count: u32,
}

impl CandidateRecord {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            affiliation_periods: Vec::new(),
            works_count: 0,
        }
    }

    pub fn with_affiliation(mut self, institution_id: impl Into<String>, years: Vec<i32>) -> Self {
        self.affiliation_periods
            .push(AffiliationPeriod::new(institution_id, years));
        self
    }

    pub fn with_works_count(mut self, works_count: u32) -> Self {
        self.works_count = works_count;
        self
    }
}

/// Coarse match quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
    NoMatches,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
            Confidence::NoMatches => "no_matches",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic flag attached to a scored candidate
#[derive(Debug, Clone, PartialEq)]
pub enum MatchFlag {
    /// Name similarity below 0.6 (value kept for the label)
    LowNameSimilarity(f64),
    /// Most recent affiliation with the institution is more than 5 years old
    OldAffiliation,
    /// Author has zero works
    NoPublications,
    /// Author has between 1 and 4 works
    FewPublications,
    /// Runner-up scored within the competitor margin of the winner
    CloseCompetitors,
}

impl fmt::Display for MatchFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchFlag::LowNameSimilarity(sim) => write!(f, "low_name_similarity_{:.2}", sim),
            MatchFlag::OldAffiliation => f.write_str("old_affiliation"),
            MatchFlag::NoPublications => f.write_str("no_publications"),
            MatchFlag::FewPublications => f.write_str("few_publications"),
            MatchFlag::CloseCompetitors => f.write_str("close_competitors"),
        }
    }
}

impl Serialize for MatchFlag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Score and flags for one candidate against one roster name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    /// Position of the candidate in the fetched sequence
    pub input_index: usize,
    pub candidate_id: String,
    pub display_name: String,
    pub name_similarity: f64,
    pub score: f64,
    pub flags: Vec<MatchFlag>,
}

/// Selection outcome for one identity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub chosen_candidate_id: Option<String>,
    pub confidence: Confidence,
    /// Flags of the chosen candidate (plus `close_competitors`)
    pub flags: Vec<MatchFlag>,
    /// All scored candidates, best first
    pub ranked: Vec<ScoredCandidate>,
}

impl MatchResult {
    pub fn no_matches() -> Self {
        Self {
            chosen_candidate_id: None,
            confidence: Confidence::NoMatches,
            flags: Vec::new(),
            ranked: Vec::new(),
        }
    }

    /// Escalation gate, always derived from confidence and flags
    pub fn needs_review(&self) -> bool {
        self.confidence == Confidence::Low || self.has_flag(&MatchFlag::CloseCompetitors)
    }

    pub fn has_flag(&self, flag: &MatchFlag) -> bool {
        self.flags.contains(flag)
    }

    /// Score of the chosen candidate
    pub fn top_score(&self) -> Option<f64> {
        self.ranked.first().map(|c| c.score)
    }

    /// Highest-ranked candidate other than the chosen one
    pub fn runner_up(&self) -> Option<&ScoredCandidate> {
        self.ranked.get(1)
    }
}

// ============================================================================
// Timeline Cleaning
// ============================================================================

/// One publication attributed to a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// Authority identifier of the person
    pub person_id: String,
    #[serde(default)]
    pub pub_year: Option<i32>,
}

impl PublicationRecord {
    pub fn new(person_id: impl Into<String>, pub_year: i32) -> Self {
        Self {
            person_id: person_id.into(),
            pub_year: Some(pub_year),
        }
    }
}

/// Distance between two consecutive publication years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub start_year: i32,
    pub end_year: i32,
    pub size: i32,
    /// Position in the ordered gap sequence
    pub index: usize,
}

impl Gap {
    pub fn location(&self) -> String {
        format!("{}-{}", self.start_year, self.end_year)
    }
}

/// Timeline classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    LikelyFalsePositiveEarly,
    MultipleLargeGaps,
    SuspiciouslyLongCareer,
    IsolatedEarlyOutlier,
    AppearsReasonable,
    InsufficientData,
    NoPapersFound,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::LikelyFalsePositiveEarly => "likely_false_positive_early",
            Recommendation::MultipleLargeGaps => "multiple_large_gaps",
            Recommendation::SuspiciouslyLongCareer => "suspiciously_long_career",
            Recommendation::IsolatedEarlyOutlier => "isolated_early_outlier",
            Recommendation::AppearsReasonable => "appears_reasonable",
            Recommendation::InsufficientData => "insufficient_data",
            Recommendation::NoPapersFound => "no_papers_found",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gap analysis result for one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineAnalysis {
    pub recommendation: Recommendation,
    /// Confidence in the recommendation (0.0-1.0)
    pub confidence: f64,
    pub suggested_first_year: Option<i32>,
    /// Informational only; never read by decision logic
    pub reasoning: String,
    pub max_gap: Option<Gap>,
    /// Number of usable publication years analyzed
    pub paper_count: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
}

impl TimelineAnalysis {
    pub fn span_years(&self) -> Option<i32> {
        Some(self.last_year? - self.first_year?)
    }
}

/// What to do with the recorded first-publication year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningAction {
    CleanToSuggested,
    FlagForManualReview,
    KeepOriginal,
}

impl CleaningAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CleaningAction::CleanToSuggested => "clean_to_suggested",
            CleaningAction::FlagForManualReview => "flag_for_manual_review",
            CleaningAction::KeepOriginal => "keep_original",
        }
    }
}

impl fmt::Display for CleaningAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Automatic cleaning decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningDecision {
    pub action: CleaningAction,
    /// `None` for `flag_for_manual_review`: a human must supply the value
    pub final_year: Option<i32>,
}
