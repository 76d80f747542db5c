//! # Scholar Common Library
//!
//! Shared code for the scholar-link workspace:
//! - Error types
//! - TOML configuration loading and resolution
//! - Clock capability (injected "today" for recency and date stamping)

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
pub use time::{Clock, FixedClock, SystemClock};
