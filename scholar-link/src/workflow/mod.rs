//! End-to-end pipelines

pub mod identity;
pub mod timeline;

pub use identity::{IdSource, IdentityOutcome, IdentityRun, IdentityWorkflow};
pub use timeline::{
    Correction, CorrectionLog, TimelineOptions, TimelineOutcome, TimelineRun, TimelineWorkflow,
};
