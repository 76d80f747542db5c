//! Publication timeline cleaning
//!
//! Gap analysis over a person's publication years and the automatic
//! decision derived from it.

pub mod cleaning;
pub mod gap_analyzer;

pub use cleaning::CleaningDecisionMaker;
pub use gap_analyzer::{compute_gaps, max_gap, year_counts, TimelineGapAnalyzer};
