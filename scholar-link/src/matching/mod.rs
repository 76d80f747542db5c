//! Identity matching
//!
//! Name normalization and similarity, candidate scoring, selection and
//! identifier conflict resolution.

pub mod candidate_scorer;
pub mod conflict_resolver;
pub mod match_selector;
pub mod name_normalizer;
pub mod name_similarity;

pub use candidate_scorer::{CandidateScore, CandidateScorer};
pub use conflict_resolver::{ConflictOutcome, ConflictResolution, ConflictResolver, IdComparison};
pub use match_selector::MatchSelector;
pub use name_normalizer::{extract_name_parts, normalize_name, roster_search_name, NameParts};
pub use name_similarity::{calculate_name_similarity, similarity};
