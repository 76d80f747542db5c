//! scholar-link library interface
//!
//! Resolves roster names to author-authority identities and cleans recorded
//! first-publication years using publication-timeline gap analysis. All
//! decision logic is pure; human judgment enters only through
//! [`review::DecisionProvider`].

pub mod error;
pub mod identifiers;
pub mod matching;
pub mod report;
pub mod review;
pub mod source;
pub mod timeline;
pub mod types;
pub mod workflow;

pub use crate::error::{RecordError, Rejection};
pub use crate::report::RunReport;
