// crates/lineage-catalog-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for lineage-catalog-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::PathBuf;

use lineage_catalog_config::ConfigError;
use lineage_catalog_config::LineageCatalogConfig;
use tempfile::TempDir;

/// Result type for tests that report failures as strings.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `LineageCatalogConfig` without validation.
pub fn config_from_toml(toml_str: &str) -> Result<LineageCatalogConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a config with all defaults applied.
pub fn minimal_config() -> Result<LineageCatalogConfig, toml::de::Error> {
    config_from_toml("")
}

/// Writes `contents` to `lineage-catalog.toml` inside `dir`.
pub fn write_config(dir: &TempDir, contents: &[u8]) -> Result<PathBuf, String> {
    let path = dir.path().join("lineage-catalog.toml");
    fs::write(&path, contents).map_err(|err| err.to_string())?;
    Ok(path)
}

/// Asserts that `result` failed validation with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(ConfigError::Invalid(message)) => {
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Err(other) => Err(format!("expected invalid config, got {other}")),
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
