//! Configuration loading and resolution tests
//!
//! Covers file parsing, validation, and the resolution priority order
//! (CLI path → SCHOLAR_LINK_CONFIG → user config → defaults).
//!
//! Note: Tests that touch SCHOLAR_LINK_CONFIG are marked #[serial] so they
//! do not race each other.

use scholar_common::config::{ConfigResolver, ConfigSource, TomlConfig, CONFIG_ENV_VAR};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let file = write_config(
        r#"
institution_id = "I999"

[matching]
close_competitor_margin = 15.0
"#,
    );

    let config = TomlConfig::load(file.path()).unwrap();
    assert_eq!(config.institution_id, "I999");
    assert_eq!(config.matching.close_competitor_margin, 15.0);
    assert_eq!(config.matching.high_threshold, 70.0);
    assert_eq!(config.cleaning.min_confidence, 0.6);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_invalid_values_rejected() {
    let file = write_config("[cleaning]\nmin_confidence = 1.5\n");
    assert!(TomlConfig::load(file.path()).is_err());

    let file = write_config("[matching]\nhigh_threshold = 40.0\n");
    assert!(TomlConfig::load(file.path()).is_err(), "medium above high");

    let file = write_config("institution_id = \"  \"\n");
    assert!(TomlConfig::load(file.path()).is_err());
}

#[test]
fn test_malformed_toml_rejected() {
    let file = write_config("[matching\nhigh_threshold = ");
    assert!(TomlConfig::load(file.path()).is_err());
}

#[test]
#[serial]
fn test_cli_path_beats_env_var() {
    let cli = write_config("institution_id = \"I_CLI\"\n");
    let env_file = write_config("institution_id = \"I_ENV\"\n");
    env::set_var(CONFIG_ENV_VAR, env_file.path());

    let resolver = ConfigResolver::new(Some(cli.path().to_path_buf()));
    assert_eq!(resolver.locate(), Some(cli.path().to_path_buf()));
    assert_eq!(resolver.resolve().unwrap().institution_id, "I_CLI");

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_path() {
    let env_file = write_config("[logging]\nlevel = \"debug\"\n");
    env::set_var(CONFIG_ENV_VAR, env_file.path());

    let config = ConfigResolver::new(None).resolve().unwrap();
    assert_eq!(config.logging.level, "debug");

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_named_file_falls_back_to_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let missing = PathBuf::from("/nonexistent/scholar-link/config.toml");

    let config = ConfigResolver::new(Some(missing.clone())).resolve().unwrap();
    assert_eq!(config.institution_id, TomlConfig::default().institution_id);

    // The fallback is reported so the caller can log it once tracing is up
    let (_, source) = ConfigResolver::new(Some(missing.clone())).load().unwrap();
    assert_eq!(source, ConfigSource::Missing(missing));
}

#[test]
#[serial]
fn test_load_reports_file_source() {
    env::remove_var(CONFIG_ENV_VAR);
    let file = write_config("[logging]\nlevel = \"warn\"\n");

    let (config, source) = ConfigResolver::new(Some(file.path().to_path_buf())).load().unwrap();
    assert_eq!(config.logging.level, "warn");
    assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
}

#[test]
#[serial]
fn test_malformed_named_file_is_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let file = write_config("institution_id = [");

    assert!(ConfigResolver::new(Some(file.path().to_path_buf())).resolve().is_err());
}
