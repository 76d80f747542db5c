//! Line-oriented terminal reviewer
//!
//! Renders each escalated case and reads single-letter commands. Invalid
//! input re-prompts; end of input answers `Quit` (or `Skip` where quitting
//! is not an option).

use super::{
    ConflictChoice, ConflictReview, DecisionProvider, LookupChoice, LookupRequest, MatchChoice,
    MatchReview, TimelineChoice, TimelineReview,
};
use crate::identifiers::parse_manual_id;
use crate::types::CandidateRecord;
use std::io::{BufRead, Write};
use tracing::warn;

/// Years shown in the per-year publication breakdown
const TIMELINE_ROWS: usize = 10;
/// Affiliations ending within this many years are shown as recent
const RECENT_AFFILIATION_WINDOW: i32 = 5;

/// Prompts a human over any reader/writer pair
pub struct TerminalReviewer<R, W> {
    input: R,
    output: W,
    earliest_year: i32,
    current_year: i32,
}

impl<R: BufRead, W: Write> TerminalReviewer<R, W> {
    /// Create a reviewer accepting custom years in `earliest_year..=current_year`
    pub fn new(input: R, output: W, earliest_year: i32, current_year: i32) -> Self {
        Self {
            input,
            output,
            earliest_year,
            current_year,
        }
    }

    /// Write a line; a broken output stream only loses the rendering
    fn say(&mut self, line: &str) {
        if let Err(e) = writeln!(self.output, "{}", line) {
            warn!(error = %e, "Failed to write review output");
        }
    }

    /// Prompt and read one trimmed line; `None` at end of input
    fn ask(&mut self, prompt: &str) -> Option<String> {
        if write!(self.output, "{}", prompt)
            .and_then(|_| self.output.flush())
            .is_err()
        {
            warn!("Failed to write review prompt");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                warn!(error = %e, "Failed to read review input");
                None
            }
        }
    }

    fn render_candidate(&mut self, number: usize, candidate: &CandidateRecord, marker: char, score: Option<f64>) {
        self.say(&format!("  {} {}. {}", marker, number, display_or_na(&candidate.display_name)));
        self.say(&format!("     ID: {}", candidate.id));
        self.say(&format!("     Works: {}", candidate.works_count));
        if let Some(score) = score {
            self.say(&format!("     Score: {:.1}", score));
        }

        let recent: Vec<&str> = candidate
            .affiliation_periods
            .iter()
            .filter(|period| {
                period
                    .years
                    .iter()
                    .max()
                    .is_some_and(|y| *y >= self.current_year - RECENT_AFFILIATION_WINDOW)
            })
            .take(2)
            .map(|period| {
                period
                    .institution
                    .display_name
                    .as_deref()
                    .unwrap_or(period.institution.id.as_str())
            })
            .collect();
        if !recent.is_empty() {
            self.say(&format!("     Recent affiliations: {}", recent.join(", ")));
        }
        self.say("");
    }
}

fn display_or_na(name: &str) -> &str {
    if name.is_empty() {
        "N/A"
    } else {
        name
    }
}

impl<R: BufRead, W: Write> DecisionProvider for TerminalReviewer<R, W> {
    fn review_match(&mut self, review: &MatchReview<'_>) -> MatchChoice {
        let result = review.result;
        let chosen = result.chosen_candidate_id.as_deref();

        self.say("");
        self.say(&format!("--- Match {}/{} ---", review.position, review.total));
        self.say(&format!("Roster name: {}", review.person));

        let many = review.candidates.len() > 1;
        if many {
            self.say(&format!("\nFound {} candidates:", review.candidates.len()));
            for (i, candidate) in review.candidates.iter().enumerate() {
                let marker = if Some(candidate.id.as_str()) == chosen { '*' } else { ' ' };
                let score = result
                    .ranked
                    .iter()
                    .find(|scored| scored.input_index == i)
                    .map(|scored| scored.score);
                self.render_candidate(i + 1, candidate, marker, score);
            }
            if let Some(top) = result.ranked.first() {
                self.say(&format!("* = Current top pick: {}", top.display_name));
            }
        } else if let Some(top) = result.ranked.first() {
            self.say(&format!("Candidate name: {}", top.display_name));
            self.say(&format!("Candidate ID: {}", top.candidate_id));
        }

        let flags: Vec<String> = result.flags.iter().map(|f| f.to_string()).collect();
        self.say(&format!("Confidence: {}", result.confidence));
        self.say(&format!("Flags: [{}]", flags.join(", ")));

        let prompt = if many {
            format!(
                "Choice: (y)es/(n)o/(1-{}) pick number/(s)kip/(q)uit: ",
                review.candidates.len()
            )
        } else {
            "Choice: (y)es/(n)o/(s)kip/(q)uit: ".to_string()
        };

        loop {
            let Some(answer) = self.ask(&prompt) else {
                return MatchChoice::Quit;
            };
            match answer.to_lowercase().as_str() {
                "y" => return MatchChoice::Approve,
                "n" => return MatchChoice::Reject,
                "s" => return MatchChoice::Skip,
                "q" => return MatchChoice::Quit,
                other if many => {
                    if let Ok(number) = other.parse::<usize>() {
                        if (1..=review.candidates.len()).contains(&number) {
                            return MatchChoice::Pick(number - 1);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn resolve_conflict(&mut self, review: &ConflictReview<'_>) -> ConflictChoice {
        self.say("");
        self.say(&format!("--- {} ---", review.person));
        self.say(&format!("Existing: https://openalex.org/authors/{}", review.existing_id));
        self.say(&format!("New:      https://openalex.org/authors/{}", review.new_id));

        loop {
            let Some(answer) = self.ask("Choose: (o)ld/(n)ew/(s)kip: ") else {
                return ConflictChoice::Skip;
            };
            match answer.to_lowercase().as_str() {
                "o" => return ConflictChoice::KeepExisting,
                "n" => return ConflictChoice::KeepNew,
                "s" => return ConflictChoice::Skip,
                _ => {}
            }
        }
    }

    fn review_timeline(&mut self, review: &TimelineReview<'_>) -> TimelineChoice {
        let analysis = review.analysis;

        self.say("");
        self.say(&format!("--- Review {}/{} ---", review.position, review.total));
        self.say(&format!("Person: {} ({})", review.name, review.person_id));
        self.say(&format!(
            "Current first pub year: {}",
            review.recorded_year.map_or_else(|| "unknown".to_string(), |y| y.to_string())
        ));
        self.say(&format!(
            "Issue: {} (confidence: {:.2})",
            analysis.recommendation, analysis.confidence
        ));
        self.say(&format!("Reasoning: {}", analysis.reasoning));
        self.say(&format!("Automatic action: {}", review.decision.action));
        if let Some(suggested) = analysis.suggested_first_year {
            self.say(&format!("Suggested correction: {}", suggested));
        }
        if let Some(gap) = &analysis.max_gap {
            self.say(&format!("Max gap: {} years at {}", gap.size, gap.location()));
        }

        if !review.year_counts.is_empty() {
            let total: usize = review.year_counts.iter().map(|(_, n)| n).sum();
            self.say(&format!("\nPublication timeline ({} total papers):", total));
            for (year, count) in review.year_counts.iter().take(TIMELINE_ROWS) {
                let current = if Some(*year) == review.recorded_year { '*' } else { ' ' };
                let suggested = if Some(*year) == analysis.suggested_first_year { '>' } else { ' ' };
                self.say(&format!("  {}{} {}: {} papers", current, suggested, year, count));
            }
            if review.year_counts.len() > TIMELINE_ROWS {
                self.say(&format!(
                    "  ... and {} more years",
                    review.year_counts.len() - TIMELINE_ROWS
                ));
                if let Some((year, count)) = review.year_counts.last() {
                    self.say(&format!("  Last year: {} ({} papers)", year, count));
                }
            }
        }

        loop {
            let Some(answer) = self.ask("\nChoice: (k)eep/(s)uggested/(c)ustom year/(skip)/(q)uit: ") else {
                return TimelineChoice::Quit;
            };
            match answer.to_lowercase().as_str() {
                "k" | "keep" => return TimelineChoice::Keep,
                "s" | "suggested" if analysis.suggested_first_year.is_some() => {
                    return TimelineChoice::Suggested
                }
                "c" | "custom" => {
                    let Some(typed) = self.ask("Enter custom year: ") else {
                        return TimelineChoice::Quit;
                    };
                    match typed.parse::<i32>() {
                        Ok(year) if (self.earliest_year..=self.current_year).contains(&year) => {
                            return TimelineChoice::Custom(year)
                        }
                        Ok(_) => self.say(&format!(
                            "Please enter a reasonable year ({}-{})",
                            self.earliest_year, self.current_year
                        )),
                        Err(_) => self.say("Please enter a valid year"),
                    }
                }
                "skip" | "" => return TimelineChoice::Skip,
                "q" | "quit" => return TimelineChoice::Quit,
                _ => self.say("Invalid choice. Use: k/s/c/skip/q"),
            }
        }
    }

    fn manual_lookup(&mut self, request: &LookupRequest<'_>) -> LookupChoice {
        self.say("");
        self.say(&format!("--- {}/{} ---", request.position, request.total));
        self.say(&format!("Person: {}", request.person));
        self.say(&format!(
            "Search URL: https://openalex.org/authors?search={}",
            request.person.replace(' ', "%20")
        ));

        loop {
            let Some(answer) = self.ask("Author ID (A1234567890) or (n)one/(s)kip/(q)uit: ") else {
                return LookupChoice::Quit;
            };
            match answer.to_lowercase().as_str() {
                "q" => return LookupChoice::Quit,
                "s" => return LookupChoice::Skip,
                "n" => return LookupChoice::NoMatch,
                _ => match parse_manual_id(&answer) {
                    Ok(id) => return LookupChoice::Id(id),
                    Err(_) => self.say("Enter valid author ID (A1234567890) or n/s/q"),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CleaningAction, CleaningDecision, Confidence, MatchResult, Recommendation, ScoredCandidate, TimelineAnalysis};
    use std::io::Cursor;

    fn reviewer(input: &str) -> TerminalReviewer<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalReviewer::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), 1900, 2025)
    }

    fn two_candidates() -> (Vec<CandidateRecord>, MatchResult) {
        let candidates = vec![
            CandidateRecord::new("A1", "John Smith").with_works_count(10),
            CandidateRecord::new("A2", "John Smyth").with_works_count(3),
        ];
        let scored = |i: usize, id: &str, score: f64| ScoredCandidate {
            input_index: i,
            candidate_id: id.to_string(),
            display_name: candidates[i].display_name.clone(),
            name_similarity: 1.0,
            score,
            flags: Vec::new(),
        };
        let result = MatchResult {
            chosen_candidate_id: Some("A1".to_string()),
            confidence: Confidence::Medium,
            flags: Vec::new(),
            ranked: vec![scored(0, "A1", 60.0), scored(1, "A2", 55.0)],
        };
        (candidates, result)
    }

    #[test]
    fn test_match_pick_number_after_invalid_input() {
        let (candidates, result) = two_candidates();
        let review = MatchReview {
            person: "John Smith",
            position: 1,
            total: 1,
            result: &result,
            candidates: &candidates,
        };

        let mut terminal = reviewer("9\nmaybe\n2\n");
        assert_eq!(terminal.review_match(&review), MatchChoice::Pick(1));

        let rendered = String::from_utf8(terminal.output).unwrap();
        assert!(rendered.contains("Found 2 candidates"));
        assert!(rendered.contains("* 1. John Smith"));
    }

    #[test]
    fn test_match_letters_and_eof() {
        let (candidates, result) = two_candidates();
        let review = MatchReview {
            person: "John Smith",
            position: 1,
            total: 1,
            result: &result,
            candidates: &candidates,
        };

        assert_eq!(reviewer("Y\n").review_match(&review), MatchChoice::Approve);
        assert_eq!(reviewer("n\n").review_match(&review), MatchChoice::Reject);
        assert_eq!(reviewer("s\n").review_match(&review), MatchChoice::Skip);
        assert_eq!(reviewer("").review_match(&review), MatchChoice::Quit);
    }

    #[test]
    fn test_conflict_choices() {
        let review = ConflictReview {
            person: "Jane Doe",
            existing_id: "A1",
            new_id: "A2",
        };
        assert_eq!(reviewer("x\no\n").resolve_conflict(&review), ConflictChoice::KeepExisting);
        assert_eq!(reviewer("n\n").resolve_conflict(&review), ConflictChoice::KeepNew);
        assert_eq!(reviewer("").resolve_conflict(&review), ConflictChoice::Skip);
    }

    #[test]
    fn test_timeline_custom_year_validated() {
        let analysis = TimelineAnalysis {
            recommendation: Recommendation::MultipleLargeGaps,
            confidence: 0.6,
            suggested_first_year: None,
            reasoning: "Multiple gaps >=10 years: 2 gaps".to_string(),
            max_gap: None,
            paper_count: 3,
            first_year: Some(1970),
            last_year: Some(2000),
        };
        let decision = CleaningDecision {
            action: CleaningAction::FlagForManualReview,
            final_year: None,
        };
        let counts = [(1970, 1), (1985, 1), (2000, 1)];
        let review = TimelineReview {
            person_id: "A1",
            name: "Jane Doe",
            recorded_year: Some(1970),
            analysis: &analysis,
            decision: &decision,
            year_counts: &counts,
            position: 1,
            total: 1,
        };

        // "s" is refused without a suggestion, 1800 and "abc" are refused
        let mut terminal = reviewer("s\nc\n1800\nc\nabc\nc\n1985\n");
        assert_eq!(terminal.review_timeline(&review), TimelineChoice::Custom(1985));
        let rendered = String::from_utf8(terminal.output).unwrap();
        assert!(rendered.contains("Please enter a reasonable year (1900-2025)"));
        assert!(rendered.contains("Please enter a valid year"));

        assert_eq!(reviewer("\n").review_timeline(&review), TimelineChoice::Skip);
        assert_eq!(reviewer("keep\n").review_timeline(&review), TimelineChoice::Keep);
        assert_eq!(reviewer("q\n").review_timeline(&review), TimelineChoice::Quit);
    }

    #[test]
    fn test_manual_lookup_validates_ids() {
        let request = LookupRequest {
            person: "Jane Doe",
            position: 1,
            total: 1,
        };
        let mut terminal = reviewer("A123\nhttps://openalex.org/A1234567890\n");
        assert_eq!(
            terminal.manual_lookup(&request),
            LookupChoice::Id("A1234567890".to_string())
        );
        let rendered = String::from_utf8(terminal.output).unwrap();
        assert!(rendered.contains("search=Jane%20Doe"));

        assert_eq!(reviewer("n\n").manual_lookup(&request), LookupChoice::NoMatch);
        assert_eq!(reviewer("s\n").manual_lookup(&request), LookupChoice::Skip);
    }
}
