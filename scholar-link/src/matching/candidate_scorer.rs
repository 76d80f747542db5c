//! Candidate Scorer
//!
//! Scores one authority record against one roster name. Three signals:
//!
//! | Signal               | Points                                   |
//! |----------------------|------------------------------------------|
//! | Name similarity      | `similarity * 60`                        |
//! | Affiliation recency  | +30 (≤2 yrs), +20 (≤5 yrs), +10 (older)  |
//! | Publication activity | −10 when the author has no works         |
//!
//! The total is not capped: the observed range is −10 to 90.

use crate::error::RecordError;
use crate::identifiers::normalize_authority_id;
use crate::matching::name_similarity::calculate_name_similarity;
use crate::types::{CandidateRecord, MatchFlag};
use scholar_common::Clock;
use tracing::debug;

/// Points awarded per unit of name similarity
const NAME_POINTS: f64 = 60.0;
/// Name similarity below which the candidate is flagged
const LOW_NAME_SIMILARITY: f64 = 0.6;

const RECENT_AFFILIATION_POINTS: f64 = 30.0;
const MODERATE_AFFILIATION_POINTS: f64 = 20.0;
const OLD_AFFILIATION_POINTS: f64 = 10.0;
/// Years since last affiliation still counted as current
const RECENT_AFFILIATION_YEARS: i32 = 2;
/// Years since last affiliation still counted as recent
const MODERATE_AFFILIATION_YEARS: i32 = 5;

const NO_PUBLICATIONS_PENALTY: f64 = -10.0;
/// Works count below which the candidate is flagged as thinly published
const FEW_PUBLICATIONS: u32 = 5;

/// Score of one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub score: f64,
    pub name_similarity: f64,
    pub flags: Vec<MatchFlag>,
}

/// Scores candidates relative to an institution of interest and a fixed "now"
#[derive(Debug, Clone)]
pub struct CandidateScorer {
    /// Normalized institution id
    institution_id: String,
    current_year: i32,
}

impl CandidateScorer {
    /// Create a scorer for `institution_id`, reading the current year from `clock`
    pub fn new(institution_id: &str, clock: &dyn Clock) -> Self {
        Self::with_current_year(institution_id, clock.current_year())
    }

    pub fn with_current_year(institution_id: &str, current_year: i32) -> Self {
        Self {
            institution_id: normalize_authority_id(institution_id).unwrap_or_default(),
            current_year,
        }
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Score `candidate` against `identity_name`
    ///
    /// # Errors
    /// Returns `RecordError::EmptyName` if either name has no usable tokens.
    pub fn score(
        &self,
        identity_name: &str,
        candidate: &CandidateRecord,
    ) -> Result<CandidateScore, RecordError> {
        let mut flags = Vec::new();

        // 1. Name similarity (0-60 points)
        let name_similarity = calculate_name_similarity(identity_name, &candidate.display_name)?;
        let mut score = name_similarity * NAME_POINTS;
        if name_similarity < LOW_NAME_SIMILARITY {
            flags.push(MatchFlag::LowNameSimilarity(name_similarity));
        }

        // 2. Affiliation recency (0-30 points)
        if let Some(most_recent) = self.most_recent_affiliation_year(candidate) {
            let gap = self.current_year - most_recent;
            if gap <= RECENT_AFFILIATION_YEARS {
                score += RECENT_AFFILIATION_POINTS;
            } else if gap <= MODERATE_AFFILIATION_YEARS {
                score += MODERATE_AFFILIATION_POINTS;
            } else {
                score += OLD_AFFILIATION_POINTS;
                flags.push(MatchFlag::OldAffiliation);
            }
        }

        // 3. Publication activity
        if candidate.works_count == 0 {
            score += NO_PUBLICATIONS_PENALTY;
            flags.push(MatchFlag::NoPublications);
        } else if candidate.works_count < FEW_PUBLICATIONS {
            flags.push(MatchFlag::FewPublications);
        }

        debug!(
            identity = %identity_name,
            candidate = %candidate.id,
            name_similarity,
            score,
            flags = flags.len(),
            "Scored candidate"
        );

        Ok(CandidateScore {
            score,
            name_similarity,
            flags,
        })
    }

    /// Latest year the candidate was affiliated with the institution of interest
    fn most_recent_affiliation_year(&self, candidate: &CandidateRecord) -> Option<i32> {
        candidate
            .affiliation_periods
            .iter()
            .filter(|period| {
                normalize_authority_id(&period.institution.id).as_deref()
                    == Some(self.institution_id.as_str())
            })
            .flat_map(|period| period.years.iter().copied())
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_common::FixedClock;

    const INSTITUTION: &str = "I111236770";

    fn scorer() -> CandidateScorer {
        CandidateScorer::new(INSTITUTION, &FixedClock::for_year(2025))
    }

    fn exact_candidate() -> CandidateRecord {
        CandidateRecord::new("A5000000001", "John Smith").with_works_count(20)
    }

    #[test]
    fn test_perfect_recent_match_scores_ninety() {
        let candidate = exact_candidate().with_affiliation(INSTITUTION, vec![2019, 2024]);
        let result = scorer().score("John Smith", &candidate).unwrap();
        assert_eq!(result.score, 90.0);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_affiliation_recency_buckets() {
        let cases = [(2023, 90.0), (2022, 80.0), (2020, 80.0), (2019, 70.0)];
        for (year, expected) in cases {
            let candidate = exact_candidate().with_affiliation(INSTITUTION, vec![year]);
            let result = scorer().score("John Smith", &candidate).unwrap();
            assert_eq!(result.score, expected, "last affiliation {}", year);
        }

        let old = exact_candidate().with_affiliation(INSTITUTION, vec![2010]);
        let result = scorer().score("John Smith", &old).unwrap();
        assert_eq!(result.flags, vec![MatchFlag::OldAffiliation]);
    }

    #[test]
    fn test_other_institutions_ignored() {
        let candidate = exact_candidate().with_affiliation("I999", vec![2025]);
        let result = scorer().score("John Smith", &candidate).unwrap();
        assert_eq!(result.score, 60.0, "no institution years means no recency points");
    }

    #[test]
    fn test_institution_url_form_matches() {
        let candidate =
            exact_candidate().with_affiliation("https://openalex.org/I111236770", vec![2024]);
        let result = scorer().score("John Smith", &candidate).unwrap();
        assert_eq!(result.score, 90.0);
    }

    #[test]
    fn test_years_merged_across_periods() {
        let candidate = exact_candidate()
            .with_affiliation(INSTITUTION, vec![2001, 2002])
            .with_affiliation(INSTITUTION, vec![2024]);
        let result = scorer().score("John Smith", &candidate).unwrap();
        assert_eq!(result.score, 90.0);
    }

    #[test]
    fn test_publication_activity() {
        let none = CandidateRecord::new("A1", "John Smith");
        let result = scorer().score("John Smith", &none).unwrap();
        assert_eq!(result.score, 50.0);
        assert_eq!(result.flags, vec![MatchFlag::NoPublications]);

        let few = CandidateRecord::new("A1", "John Smith").with_works_count(4);
        let result = scorer().score("John Smith", &few).unwrap();
        assert_eq!(result.score, 60.0);
        assert_eq!(result.flags, vec![MatchFlag::FewPublications]);
    }

    #[test]
    fn test_score_is_not_clamped_below_zero() {
        let candidate = CandidateRecord::new("A1", "Zq Xv");
        let result = scorer().score("Ab Cd", &candidate).unwrap();
        assert!(result.score < 0.0, "expected negative score, got {}", result.score);
        assert!(matches!(result.flags[0], MatchFlag::LowNameSimilarity(_)));
        assert!(result.flags.contains(&MatchFlag::NoPublications));
    }

    #[test]
    fn test_low_similarity_flag_label() {
        let candidate = CandidateRecord::new("A1", "Robert Jones").with_works_count(10);
        let result = scorer().score("John Smith", &candidate).unwrap();
        let label = result.flags[0].to_string();
        assert!(label.starts_with("low_name_similarity_"), "got {}", label);
        assert_eq!(label, format!("low_name_similarity_{:.2}", result.name_similarity));
    }

    #[test]
    fn test_empty_candidate_name_is_error() {
        let candidate = CandidateRecord::new("A1", "");
        assert!(scorer().score("John Smith", &candidate).is_err());
    }
}
