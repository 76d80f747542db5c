//! First-publication-year cleaning workflow
//!
//! Joins roster entries to their publication records, analyzes each
//! timeline, applies the automatic decision and then offers flagged cases
//! for review. Every year set by a reviewer lands in the [`CorrectionLog`].

use crate::error::{RecordError, Rejection};
use crate::identifiers::normalize_authority_id;
use crate::review::{DecisionProvider, TimelineChoice, TimelineReview};
use crate::timeline::{year_counts, CleaningDecisionMaker, TimelineGapAnalyzer};
use crate::types::{
    CleaningDecision, Identity, PublicationRecord, Recommendation, TimelineAnalysis,
};
use chrono::NaiveDate;
use scholar_common::config::CleaningConfig;
use scholar_common::Clock;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Knobs for one cleaning run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineOptions {
    pub min_confidence: f64,
    pub review_min_confidence: f64,
    pub earliest_plausible_year: i32,
    /// Drop publications earlier than the recorded first year before analysis
    pub drop_before_recorded_year: bool,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self::from(&CleaningConfig::default())
    }
}

impl From<&CleaningConfig> for TimelineOptions {
    fn from(config: &CleaningConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            review_min_confidence: config.review_min_confidence,
            earliest_plausible_year: config.earliest_plausible_year,
            drop_before_recorded_year: false,
        }
    }
}

/// One human correction of a first-publication year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    pub person_id: String,
    pub corrected_first_pub_year: i32,
    pub correction_date: NaiveDate,
}

/// Append-only record of human corrections
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct CorrectionLog {
    entries: Vec<Correction>,
}

impl CorrectionLog {
    pub fn record(&mut self, person_id: &str, year: i32, date: NaiveDate) {
        self.entries.push(Correction {
            person_id: person_id.to_string(),
            corrected_first_pub_year: year,
            correction_date: date,
        });
    }

    pub fn entries(&self) -> &[Correction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Final state of one person's first-publication year
#[derive(Debug, Clone, Serialize)]
pub struct TimelineOutcome {
    pub person_id: String,
    pub name: String,
    /// Recorded first-publication year before this run
    pub original_year: Option<i32>,
    pub analysis: TimelineAnalysis,
    /// Automatic decision, before any review
    pub decision: CleaningDecision,
    /// Value to persist; `None` leaves the recorded year untouched
    pub final_year: Option<i32>,
    pub reviewed: bool,
    pub manually_corrected: bool,
}

/// Everything a cleaning run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimelineRun {
    pub outcomes: Vec<TimelineOutcome>,
    pub corrections: CorrectionLog,
    pub rejections: Vec<Rejection>,
    /// Cases offered for review
    pub escalated: usize,
}

/// Drives analysis, automatic decisions and review over a roster
pub struct TimelineWorkflow<'c> {
    analyzer: TimelineGapAnalyzer,
    decision_maker: CleaningDecisionMaker,
    options: TimelineOptions,
    clock: &'c dyn Clock,
}

impl<'c> TimelineWorkflow<'c> {
    pub fn new(options: TimelineOptions, clock: &'c dyn Clock) -> Self {
        Self {
            analyzer: TimelineGapAnalyzer::new(),
            decision_maker: CleaningDecisionMaker::new(options.min_confidence),
            options,
            clock,
        }
    }

    /// Clean the recorded first-publication year of every roster entry
    ///
    /// Entries are joined to publications on their recorded identifier.
    pub fn run(
        &self,
        roster: &[Identity],
        publications: &[PublicationRecord],
        provider: &mut dyn DecisionProvider,
    ) -> TimelineRun {
        let mut run = TimelineRun::default();
        let by_person = self.group_publications(publications, &mut run.rejections);

        let mut year_lists: Vec<Vec<i32>> = Vec::new();
        for identity in roster {
            let Some(person_id) = identity.existing_id.as_deref().and_then(normalize_authority_id)
            else {
                let e = RecordError::MissingIdentifier(identity.raw_name.clone());
                warn!(person = %identity.raw_name, "Skipping roster entry without identifier");
                run.rejections.push(Rejection::new(identity.raw_name.as_str(), &e));
                continue;
            };

            let found = by_person.get(&person_id).map(Vec::as_slice);
            let (outcome, years) = self.analyze_person(identity, person_id, found);
            year_lists.push(years);
            run.outcomes.push(outcome);
        }

        run.escalated = self.review(&mut run, &year_lists, provider);

        info!(
            total = run.outcomes.len(),
            escalated = run.escalated,
            corrected = run.corrections.len(),
            rejected = run.rejections.len(),
            "Cleaning run complete"
        );
        run
    }

    /// Usable years per normalized person id; an empty entry means records
    /// exist but none has a usable year
    ///
    /// Years outside `earliest_plausible_year..=current_year + 1` are rejected.
    fn group_publications(
        &self,
        publications: &[PublicationRecord],
        rejections: &mut Vec<Rejection>,
    ) -> HashMap<String, Vec<i32>> {
        let earliest = self.options.earliest_plausible_year;
        let latest = self.clock.current_year().saturating_add(1);
        let mut by_person: HashMap<String, Vec<i32>> = HashMap::new();
        for record in publications {
            let Some(person_id) = normalize_authority_id(&record.person_id) else {
                continue;
            };
            let years = by_person.entry(person_id).or_default();
            match record.pub_year {
                Some(year) if (earliest..=latest).contains(&year) => years.push(year),
                Some(year) => {
                    let e = RecordError::YearOutOfRange {
                        year,
                        earliest,
                        latest,
                    };
                    warn!(person_id = %record.person_id, error = %e, "Publication year excluded");
                    rejections.push(Rejection::new(record.person_id.as_str(), &e));
                }
                None => {
                    let e = RecordError::MissingYear {
                        person_id: record.person_id.clone(),
                    };
                    debug!(person_id = %record.person_id, "Publication without year excluded");
                    rejections.push(Rejection::new(record.person_id.as_str(), &e));
                }
            }
        }
        by_person
    }

    fn analyze_person(
        &self,
        identity: &Identity,
        person_id: String,
        publications: Option<&[i32]>,
    ) -> (TimelineOutcome, Vec<i32>) {
        let recorded = identity.first_pub_year;

        let (analysis, years) = match publications {
            None => (self.analyzer.no_papers_found(), Vec::new()),
            Some(all_years) => {
                let years: Vec<i32> = match recorded {
                    Some(floor) if self.options.drop_before_recorded_year => {
                        all_years.iter().copied().filter(|y| *y >= floor).collect()
                    }
                    _ => all_years.to_vec(),
                };
                let payroll_year = identity
                    .payroll_year
                    .unwrap_or_else(|| self.clock.current_year());
                (self.analyzer.analyze(&years, payroll_year), years)
            }
        };

        let decision = self.decision_maker.decide(&analysis, recorded);
        debug!(
            person_id = %person_id,
            recommendation = %analysis.recommendation,
            confidence = analysis.confidence,
            action = %decision.action,
            "Timeline analyzed"
        );

        let outcome = TimelineOutcome {
            person_id,
            name: identity.raw_name.clone(),
            original_year: recorded,
            final_year: decision.final_year,
            analysis,
            decision,
            reviewed: false,
            manually_corrected: false,
        };
        (outcome, years)
    }

    fn needs_review(&self, analysis: &TimelineAnalysis) -> bool {
        analysis.recommendation != Recommendation::AppearsReasonable
            && analysis.confidence >= self.options.review_min_confidence
    }

    /// Returns the number of cases offered for review
    fn review(
        &self,
        run: &mut TimelineRun,
        year_lists: &[Vec<i32>],
        provider: &mut dyn DecisionProvider,
    ) -> usize {
        let flagged: Vec<usize> = run
            .outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| self.needs_review(&o.analysis))
            .map(|(i, _)| i)
            .collect();
        let total = flagged.len();
        let earliest = self.options.earliest_plausible_year;
        let latest = self.clock.current_year();

        for (position, &i) in flagged.iter().enumerate() {
            let outcome = &mut run.outcomes[i];
            let counts = year_counts(&year_lists[i]);
            let review = TimelineReview {
                person_id: &outcome.person_id,
                name: &outcome.name,
                recorded_year: outcome.original_year,
                analysis: &outcome.analysis,
                decision: &outcome.decision,
                year_counts: &counts,
                position: position + 1,
                total,
            };

            let corrected = match provider.review_timeline(&review) {
                TimelineChoice::Keep => match outcome.original_year {
                    Some(year) => Some(year),
                    None => {
                        outcome.reviewed = true;
                        outcome.final_year = None;
                        None
                    }
                },
                TimelineChoice::Suggested => match outcome.analysis.suggested_first_year {
                    Some(year) => Some(year),
                    None => {
                        warn!(person_id = %outcome.person_id, "No suggested year to apply, skipping");
                        None
                    }
                },
                TimelineChoice::Custom(year) if (earliest..=latest).contains(&year) => Some(year),
                TimelineChoice::Custom(year) => {
                    let e = RecordError::YearOutOfRange {
                        year,
                        earliest,
                        latest,
                    };
                    warn!(person_id = %outcome.person_id, error = %e, "Ignoring custom year");
                    run.rejections.push(Rejection::new(outcome.person_id.as_str(), &e));
                    None
                }
                TimelineChoice::Skip => None,
                TimelineChoice::Quit => {
                    info!(remaining = total - position, "Timeline review stopped");
                    break;
                }
            };

            if let Some(year) = corrected {
                outcome.reviewed = true;
                outcome.final_year = Some(year);
                outcome.manually_corrected = true;
                run.corrections
                    .record(&outcome.person_id, year, self.clock.today());
                info!(person_id = %outcome.person_id, year, "First publication year corrected");
            }
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{DeferAll, ScriptedDecisions};
    use crate::types::CleaningAction;
    use scholar_common::FixedClock;

    fn person(id: &str, recorded: i32) -> Identity {
        Identity::new("Doe, Jane")
            .with_existing_id(id)
            .with_first_pub_year(recorded)
            .with_payroll_year(2020)
    }

    fn pubs(id: &str, years: &[i32]) -> Vec<PublicationRecord> {
        years.iter().map(|y| PublicationRecord::new(id, *y)).collect()
    }

    #[test]
    fn test_auto_clean_without_review() {
        let clock = FixedClock::for_year(2025);
        let workflow = TimelineWorkflow::new(TimelineOptions::default(), &clock);
        let run = workflow.run(
            &[person("A1", 1975)],
            &pubs("A1", &[1975, 1991, 1992, 1993, 1994]),
            &mut DeferAll,
        );

        let outcome = &run.outcomes[0];
        assert_eq!(outcome.decision.action, CleaningAction::CleanToSuggested);
        assert_eq!(outcome.final_year, Some(1991));
        assert!(!outcome.manually_corrected);
        assert_eq!(run.escalated, 1);
        assert!(run.corrections.is_empty());
    }

    #[test]
    fn test_custom_year_logged_with_clock_date() {
        let clock = FixedClock::for_year(2025);
        let workflow = TimelineWorkflow::new(TimelineOptions::default(), &clock);
        let mut provider = ScriptedDecisions::new().timeline(TimelineChoice::Custom(1988));

        let run = workflow.run(
            &[person("A1", 1975)],
            &pubs("A1", &[1975, 1991, 1992, 1993, 1994]),
            &mut provider,
        );

        assert_eq!(run.outcomes[0].final_year, Some(1988));
        assert!(run.outcomes[0].manually_corrected);
        assert_eq!(run.corrections.len(), 1);
        assert_eq!(run.corrections.entries()[0].correction_date, clock.today());
    }

    #[test]
    fn test_roster_entry_without_id_rejected() {
        let clock = FixedClock::for_year(2025);
        let workflow = TimelineWorkflow::new(TimelineOptions::default(), &clock);
        let run = workflow.run(&[Identity::new("Doe, Jane")], &[], &mut DeferAll);
        assert!(run.outcomes.is_empty());
        assert_eq!(run.rejections.len(), 1);
    }
}
