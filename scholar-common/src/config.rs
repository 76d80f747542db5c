//! Configuration loading and resolution
//!
//! # Settings Sources Priority
//!
//! 1. Command-line argument (`--config PATH`)
//! 2. Environment variable (`SCHOLAR_LINK_CONFIG`)
//! 3. User config file (`<config_dir>/scholar-link/config.toml`)
//! 4. Built-in defaults (code constants)
//!
//! A missing file never stops a run: the resolver logs a warning and falls
//! back to defaults. A file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SCHOLAR_LINK_CONFIG";

/// Default institution of interest (OpenAlex institution id)
pub const DEFAULT_INSTITUTION_ID: &str = "I111236770";

/// Top-level configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Institution whose affiliation years drive the recency score
    #[serde(default = "default_institution_id")]
    pub institution_id: String,

    /// Candidate selection thresholds
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Timeline cleaning thresholds
    #[serde(default)]
    pub cleaning: CleaningConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            institution_id: default_institution_id(),
            matching: MatchingConfig::default(),
            cleaning: CleaningConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Confidence tier boundaries for candidate selection
///
/// Scores are the uncapped 60/30/-10 point sums produced by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MatchingConfig {
    /// Score strictly above this is `high`
    #[serde(default = "default_high_threshold")]
    pub high_threshold: f64,

    /// Score strictly above this (and not high) is `medium`
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: f64,

    /// Top-two score difference below which `close_competitors` is flagged
    #[serde(default = "default_close_competitor_margin")]
    pub close_competitor_margin: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            high_threshold: default_high_threshold(),
            medium_threshold: default_medium_threshold(),
            close_competitor_margin: default_close_competitor_margin(),
        }
    }
}

/// Thresholds for first-publication-year cleaning
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CleaningConfig {
    /// Minimum analysis confidence for an automatic action
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Minimum analysis confidence for a case to be offered for review
    #[serde(default = "default_review_min_confidence")]
    pub review_min_confidence: f64,

    /// Earliest year a reviewer may enter as a custom correction
    #[serde(default = "default_earliest_plausible_year")]
    pub earliest_plausible_year: i32,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            review_min_confidence: default_review_min_confidence(),
            earliest_plausible_year: default_earliest_plausible_year(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_institution_id() -> String {
    DEFAULT_INSTITUTION_ID.to_string()
}

fn default_high_threshold() -> f64 {
    70.0
}

fn default_medium_threshold() -> f64 {
    50.0
}

fn default_close_competitor_margin() -> f64 {
    10.0
}

fn default_min_confidence() -> f64 {
    0.6
}

fn default_review_min_confidence() -> f64 {
    0.5
}

fn default_earliest_plausible_year() -> i32 {
    1900
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read config {} failed: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.institution_id.trim().is_empty() {
            return Err(Error::Config("institution_id must not be empty".to_string()));
        }
        if self.matching.medium_threshold > self.matching.high_threshold {
            return Err(Error::Config(format!(
                "matching.medium_threshold ({}) exceeds matching.high_threshold ({})",
                self.matching.medium_threshold, self.matching.high_threshold
            )));
        }
        for (key, value) in [
            ("cleaning.min_confidence", self.cleaning.min_confidence),
            ("cleaning.review_min_confidence", self.cleaning.review_min_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be within 0.0-1.0, got {}",
                    key, value
                )));
            }
        }
        Ok(())
    }
}

/// Resolves which config file (if any) to load
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Locate the config file following the priority order
    ///
    /// Returns `None` when no source names a file and the user config file
    /// does not exist.
    pub fn locate(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: User config file
        default_config_path().filter(|path| path.exists())
    }

    /// Load the resolved configuration and log where it came from
    ///
    /// A named file that does not exist degrades to defaults with a warning;
    /// a file that exists but fails to parse is an error.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let (config, source) = self.load()?;
        source.log();
        Ok(config)
    }

    /// Load the resolved configuration without logging
    ///
    /// For callers that install their subscriber from the loaded config and
    /// call [`ConfigSource::log`] afterwards.
    pub fn load(&self) -> Result<(TomlConfig, ConfigSource)> {
        let Some(path) = self.locate() else {
            return Ok((TomlConfig::default(), ConfigSource::Defaults));
        };

        if !path.exists() {
            return Ok((TomlConfig::default(), ConfigSource::Missing(path)));
        }

        let config = TomlConfig::load(&path)?;
        Ok((config, ConfigSource::File(path)))
    }
}

/// Where the resolved configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// No source named a file
    Defaults,
    /// A file was named but does not exist
    Missing(PathBuf),
    File(PathBuf),
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::Defaults => info!("No config file found, using built-in defaults"),
            ConfigSource::Missing(path) => warn!(
                path = %path.display(),
                "Config file not found, using built-in defaults"
            ),
            ConfigSource::File(path) => info!(path = %path.display(), "Loaded configuration"),
        }
    }
}

/// Platform config file location (`~/.config/scholar-link/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scholar-link").join("config.toml"))
}
