//! Timeline Gap Analyzer
//!
//! Classifies a person's publication years by looking at the gaps between
//! consecutive years. A long silence near the start of a career usually
//! means an early paper was misattributed.
//!
//! # Rules
//! Evaluated in order, first match wins:
//! 1. Early large gap: largest gap ≥ 15 within the first 30% of the gaps
//! 2. Multiple large gaps: two or more gaps ≥ 10
//! 3. Excessive career span: more than 40 years before the payroll year
//! 4. Isolated early outlier: first gap ≥ 15 and more than 5x the median later gap
//! 5. Otherwise the timeline appears reasonable

use crate::types::{Gap, Recommendation, TimelineAnalysis};
use tracing::debug;

const EARLY_GAP_MIN_SIZE: i32 = 15;
const EARLY_GAP_MAX_POSITION: f64 = 0.3;
const LARGE_GAP_MIN_SIZE: i32 = 10;
const LARGE_GAP_MIN_COUNT: usize = 2;
const MAX_CAREER_SPAN: i32 = 40;
const OUTLIER_MIN_YEARS: usize = 3;
const OUTLIER_MEDIAN_FACTOR: f64 = 5.0;

/// Consecutive gaps of an ascending year sequence
pub fn compute_gaps(years: &[i32]) -> Vec<Gap> {
    years
        .windows(2)
        .enumerate()
        .map(|(index, pair)| Gap {
            start_year: pair[0],
            end_year: pair[1],
            size: pair[1].saturating_sub(pair[0]),
            index,
        })
        .collect()
}

/// Largest gap; the earliest one wins a tie
pub fn max_gap(gaps: &[Gap]) -> Option<Gap> {
    gaps.iter().fold(None, |best: Option<Gap>, gap| match best {
        Some(b) if b.size >= gap.size => Some(b),
        _ => Some(*gap),
    })
}

/// Median with the two middle values averaged for even counts
fn median(values: &mut [i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((f64::from(values[mid - 1]) + f64::from(values[mid])) / 2.0)
    } else {
        Some(f64::from(values[mid]))
    }
}

/// Everything the rules look at, computed once
struct TimelineFacts<'a> {
    years: &'a [i32],
    gaps: Vec<Gap>,
    max_gap: Option<Gap>,
    payroll_year: i32,
}

/// Outcome of a rule that fired
struct Verdict {
    recommendation: Recommendation,
    confidence: f64,
    suggested_first_year: Option<i32>,
    reasoning: String,
}

type Rule = fn(&TimelineFacts<'_>) -> Option<Verdict>;

const RULES: [(&str, Rule); 4] = [
    ("early_large_gap", early_large_gap),
    ("multiple_large_gaps", multiple_large_gaps),
    ("excessive_career_span", excessive_career_span),
    ("isolated_early_outlier", isolated_early_outlier),
];

fn early_large_gap(facts: &TimelineFacts<'_>) -> Option<Verdict> {
    let gap = facts.max_gap?;
    let position = gap.index as f64 / (facts.years.len() - 1) as f64;
    (gap.size >= EARLY_GAP_MIN_SIZE && position < EARLY_GAP_MAX_POSITION).then(|| Verdict {
        recommendation: Recommendation::LikelyFalsePositiveEarly,
        confidence: 0.8,
        suggested_first_year: Some(gap.end_year),
        reasoning: format!("Large {}-year gap early in career", gap.size),
    })
}

fn multiple_large_gaps(facts: &TimelineFacts<'_>) -> Option<Verdict> {
    let large = facts
        .gaps
        .iter()
        .filter(|g| g.size >= LARGE_GAP_MIN_SIZE)
        .count();
    (large >= LARGE_GAP_MIN_COUNT).then(|| Verdict {
        recommendation: Recommendation::MultipleLargeGaps,
        confidence: 0.6,
        suggested_first_year: None,
        reasoning: format!("Multiple gaps ≥{} years: {} gaps", LARGE_GAP_MIN_SIZE, large),
    })
}

fn excessive_career_span(facts: &TimelineFacts<'_>) -> Option<Verdict> {
    let span = facts.payroll_year.saturating_sub(*facts.years.first()?);
    (span > MAX_CAREER_SPAN).then(|| Verdict {
        recommendation: Recommendation::SuspiciouslyLongCareer,
        confidence: 0.7,
        suggested_first_year: None,
        reasoning: format!("Career span of {} years seems excessive", span),
    })
}

fn isolated_early_outlier(facts: &TimelineFacts<'_>) -> Option<Verdict> {
    if facts.years.len() < OUTLIER_MIN_YEARS {
        return None;
    }
    let early_gap = facts.years[1].saturating_sub(facts.years[0]);
    let mut later: Vec<i32> = facts.gaps[1..].iter().map(|g| g.size).collect();
    let median_gap = median(&mut later)?;

    let is_outlier =
        early_gap >= EARLY_GAP_MIN_SIZE && f64::from(early_gap) > OUTLIER_MEDIAN_FACTOR * median_gap;
    is_outlier.then(|| Verdict {
        recommendation: Recommendation::IsolatedEarlyOutlier,
        confidence: 0.9,
        suggested_first_year: Some(facts.years[1]),
        reasoning: format!(
            "First paper {} years before rest, {:.1}x median gap",
            early_gap,
            f64::from(early_gap) / median_gap
        ),
    })
}

/// Gap-based timeline classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineGapAnalyzer;

impl TimelineGapAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze one person's publication years
    ///
    /// `years` may arrive in any order and may repeat; a sorted copy is
    /// analyzed. `payroll_year` is the reference point for career span.
    pub fn analyze(&self, years: &[i32], payroll_year: i32) -> TimelineAnalysis {
        let mut sorted = years.to_vec();
        sorted.sort_unstable();

        let first_year = sorted.first().copied();
        let last_year = sorted.last().copied();

        if sorted.len() < 2 {
            return TimelineAnalysis {
                recommendation: Recommendation::InsufficientData,
                confidence: 0.0,
                suggested_first_year: first_year,
                reasoning: "Insufficient data points".to_string(),
                max_gap: None,
                paper_count: sorted.len(),
                first_year,
                last_year,
            };
        }

        let gaps = compute_gaps(&sorted);
        let facts = TimelineFacts {
            years: &sorted,
            max_gap: max_gap(&gaps),
            gaps,
            payroll_year,
        };

        let verdict = RULES
            .iter()
            .find_map(|(name, rule)| {
                let verdict = rule(&facts)?;
                debug!(rule = %name, recommendation = %verdict.recommendation, "Timeline rule fired");
                Some(verdict)
            })
            .unwrap_or_else(|| Verdict {
                recommendation: Recommendation::AppearsReasonable,
                confidence: 0.8,
                suggested_first_year: first_year,
                reasoning: "No suspicious gaps detected".to_string(),
            });

        TimelineAnalysis {
            recommendation: verdict.recommendation,
            confidence: verdict.confidence,
            suggested_first_year: verdict.suggested_first_year,
            reasoning: verdict.reasoning,
            max_gap: facts.max_gap,
            paper_count: sorted.len(),
            first_year,
            last_year,
        }
    }

    /// Result for a person with no publication records at all
    pub fn no_papers_found(&self) -> TimelineAnalysis {
        TimelineAnalysis {
            recommendation: Recommendation::NoPapersFound,
            confidence: 0.0,
            suggested_first_year: None,
            reasoning: "No publications found".to_string(),
            max_gap: None,
            paper_count: 0,
            first_year: None,
            last_year: None,
        }
    }
}

/// Year → publication count, ascending by year
pub fn year_counts(years: &[i32]) -> Vec<(i32, usize)> {
    let mut sorted = years.to_vec();
    sorted.sort_unstable();
    let mut counts: Vec<(i32, usize)> = Vec::new();
    for year in sorted {
        match counts.last_mut() {
            Some((last, n)) if *last == year => *n += 1,
            _ => counts.push((year, 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(years: &[i32], payroll_year: i32) -> TimelineAnalysis {
        TimelineGapAnalyzer::new().analyze(years, payroll_year)
    }

    fn facts(years: &[i32], payroll_year: i32) -> TimelineFacts<'_> {
        let gaps = compute_gaps(years);
        TimelineFacts {
            years,
            max_gap: max_gap(&gaps),
            gaps,
            payroll_year,
        }
    }

    #[test]
    fn test_compute_gaps() {
        let gaps = compute_gaps(&[2000, 2003, 2003, 2010]);
        let sizes: Vec<i32> = gaps.iter().map(|g| g.size).collect();
        assert_eq!(sizes, vec![3, 0, 7]);
        assert_eq!(gaps[2].start_year, 2003);
        assert_eq!(gaps[2].end_year, 2010);
        assert_eq!(gaps[2].index, 2);
        assert!(compute_gaps(&[2000]).is_empty());
    }

    #[test]
    fn test_max_gap_first_occurrence_wins() {
        let gaps = compute_gaps(&[2000, 2005, 2006, 2011]);
        let max = max_gap(&gaps).unwrap();
        assert_eq!(max.size, 5);
        assert_eq!(max.index, 0);
        assert_eq!(max_gap(&[]), None);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&mut [3, 1, 2]), Some(2.0));
        assert_eq!(median(&mut [4, 1, 2, 3]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn test_insufficient_data() {
        let result = analyze(&[2001], 2020);
        assert_eq!(result.recommendation, Recommendation::InsufficientData);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.suggested_first_year, Some(2001));

        let result = analyze(&[], 2020);
        assert_eq!(result.recommendation, Recommendation::InsufficientData);
        assert_eq!(result.suggested_first_year, None);
    }

    #[test]
    fn test_duplicate_years_count_as_data_points() {
        let result = analyze(&[2001, 2001], 2020);
        assert_eq!(result.recommendation, Recommendation::AppearsReasonable);
        assert_eq!(result.suggested_first_year, Some(2001));
    }

    #[test]
    fn test_reasonable_timeline() {
        let result = analyze(&[2000, 2002, 2004, 2006], 2020);
        assert_eq!(result.recommendation, Recommendation::AppearsReasonable);
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.suggested_first_year, Some(2000));
        assert_eq!(result.reasoning, "No suspicious gaps detected");
        assert_eq!(result.paper_count, 4);
        assert_eq!(result.span_years(), Some(6));
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let result = analyze(&[2006, 2000, 2004, 2002], 2020);
        assert_eq!(result.first_year, Some(2000));
        assert_eq!(result.suggested_first_year, Some(2000));
    }

    #[test]
    fn test_early_gap_beats_long_career() {
        let result = analyze(&[1975, 1991, 1992, 1993, 1994], 2020);
        assert_eq!(result.recommendation, Recommendation::LikelyFalsePositiveEarly);
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.suggested_first_year, Some(1991));
        assert_eq!(result.reasoning, "Large 16-year gap early in career");
        assert_eq!(result.max_gap.map(|g| g.location()), Some("1975-1991".to_string()));
    }

    #[test]
    fn test_late_large_gap_is_not_early() {
        // Gap at index 3 of 4: position 0.75
        let result = analyze(&[2000, 2001, 2002, 2003, 2020], 2021);
        assert_eq!(result.recommendation, Recommendation::AppearsReasonable);
    }

    #[test]
    fn test_multiple_large_gaps() {
        // Largest gap (12) sits at position 0.5
        let result = analyze(&[1990, 1991, 2001, 2013, 2014], 2020);
        assert_eq!(result.recommendation, Recommendation::MultipleLargeGaps);
        assert_eq!(result.confidence, 0.6);
        assert_eq!(result.suggested_first_year, None);
        assert_eq!(result.reasoning, "Multiple gaps ≥10 years: 2 gaps");
    }

    #[test]
    fn test_long_career() {
        let result = analyze(&[1975, 1980, 1985, 1990, 1995, 2000], 2020);
        assert_eq!(result.recommendation, Recommendation::SuspiciouslyLongCareer);
        assert_eq!(result.confidence, 0.7);
        assert_eq!(result.suggested_first_year, None);
        assert_eq!(result.reasoning, "Career span of 45 years seems excessive");

        // 40 is not > 40
        let result = analyze(&[1980, 1985, 1990], 2020);
        assert_eq!(result.recommendation, Recommendation::AppearsReasonable);
    }

    #[test]
    fn test_isolated_outlier_guard() {
        let years = [1960, 1995, 1996, 1997];
        let verdict = isolated_early_outlier(&facts(&years, 2020)).unwrap();
        assert_eq!(verdict.recommendation, Recommendation::IsolatedEarlyOutlier);
        assert_eq!(verdict.confidence, 0.9);
        assert_eq!(verdict.suggested_first_year, Some(1995));
        assert_eq!(verdict.reasoning, "First paper 35 years before rest, 35.0x median gap");

        // Early gap not large enough relative to the rest
        assert!(isolated_early_outlier(&facts(&[1980, 1995, 1999, 2003], 2020)).is_none());
        // Needs three years
        assert!(isolated_early_outlier(&facts(&[1960, 1995], 2020)).is_none());
    }

    #[test]
    fn test_isolated_outlier_shadowed_by_early_gap() {
        // Any early gap ≥ 15 is also the max gap at index 0 or one of two
        // gaps ≥ 10, so an earlier rule always claims it
        let result = analyze(&[1960, 1995, 1996, 1997], 2020);
        assert_eq!(result.recommendation, Recommendation::LikelyFalsePositiveEarly);
        assert_eq!(result.suggested_first_year, Some(1995));
    }

    #[test]
    fn test_extreme_years_do_not_overflow() {
        let result = analyze(&[i32::MIN, 2000, 2001], 2020);
        assert_eq!(result.recommendation, Recommendation::LikelyFalsePositiveEarly);
        assert_eq!(result.suggested_first_year, Some(2000));
        assert_eq!(result.max_gap.map(|g| g.size), Some(i32::MAX));

        let result = analyze(&[2000, 2001, i32::MAX], i32::MIN);
        assert_eq!(result.max_gap.map(|g| g.end_year), Some(i32::MAX));
    }

    #[test]
    fn test_no_papers_found() {
        let result = TimelineGapAnalyzer::new().no_papers_found();
        assert_eq!(result.recommendation, Recommendation::NoPapersFound);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.paper_count, 0);
    }

    #[test]
    fn test_year_counts() {
        assert_eq!(
            year_counts(&[2003, 2001, 2003, 2002, 2003]),
            vec![(2001, 1), (2002, 1), (2003, 3)]
        );
    }
}
