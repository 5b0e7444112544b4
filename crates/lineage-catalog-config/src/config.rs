// crates/lineage-catalog-config/src/config.rs
// ============================================================================
// Module: Lineage Catalog Configuration
// Description: Configuration loading and validation for the lineage catalog.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: lineage-catalog-core, lineage-catalog-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file has three sections: `[store]` selects and tunes the catalog
//! store, `[ingest]` bounds inbound events, and `[logging]` chooses where
//! ingest log records go. Missing sections take their defaults; unknown keys
//! and invalid values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use lineage_catalog_core::FileIngestLogSink;
use lineage_catalog_core::IngestConfig;
use lineage_catalog_core::IngestLogSink;
use lineage_catalog_core::NoopIngestLogSink;
use lineage_catalog_core::StderrIngestLogSink;
use lineage_catalog_store_sqlite::SqliteStoreConfig;
use lineage_catalog_store_sqlite::SqliteStoreMode;
use lineage_catalog_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "lineage-catalog.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "LINEAGE_CATALOG_CONFIG";
/// Default `SQLite` database path when `[store]` omits one.
pub const DEFAULT_STORE_PATH: &str = "lineage-catalog.db";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default busy timeout for `SQLite` connections.
pub(crate) const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum busy timeout for `SQLite` connections.
pub(crate) const MAX_BUSY_TIMEOUT_MS: u64 = 600_000;
/// Upper bound for `ingest.max_payload_bytes`.
pub(crate) const MAX_INGEST_PAYLOAD_BYTES: usize = 64 * 1024 * 1024;
/// Upper bound for `ingest.max_datasets_per_event`.
pub(crate) const MAX_INGEST_DATASETS_PER_EVENT: usize = 65_536;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Lineage catalog configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineageCatalogConfig {
    /// Catalog store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Ingestion limits.
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Ingest log configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LineageCatalogConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order is the explicit `path`, then the
    /// `LINEAGE_CATALOG_CONFIG` environment variable, then
    /// `lineage-catalog.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Loads configuration, falling back to defaults when no file is named.
    ///
    /// Defaults apply only when neither `path` nor `LINEAGE_CATALOG_CONFIG`
    /// is set and `lineage-catalog.toml` does not exist. A file that was
    /// named explicitly must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if path.is_none()
            && env::var_os(CONFIG_ENV_VAR).is_none()
            && !Path::new(DEFAULT_CONFIG_NAME).exists()
        {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        validate_ingest(&self.ingest)?;
        self.logging.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Store Config
// ============================================================================

/// Catalog store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Durable `SQLite` store.
    #[default]
    Sqlite,
    /// Process-local store; contents vanish on exit.
    Memory,
}

/// Catalog store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path; defaults to `lineage-catalog.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
            }
            StoreType::Sqlite => {
                if let Some(path) = &self.path {
                    validate_store_path(path)?;
                }
            }
        }
        if self.busy_timeout_ms == 0 || self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "store busy_timeout_ms must be between 1 and {MAX_BUSY_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }

    /// Returns the effective database path.
    #[must_use]
    pub fn effective_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
    }

    /// Builds the `SQLite` store configuration.
    #[must_use]
    pub fn sqlite_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.effective_path(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        }
    }
}

/// Returns the default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Logging Config
// ============================================================================

/// Ingest log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkType {
    /// Discard ingest log records.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `logging.path`.
    File,
}

/// Ingest log configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log destination.
    #[serde(default)]
    pub sink: LogSinkType,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoggingConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkType::File, None) => {
                Err(ConfigError::Invalid("file logging requires logging.path".to_string()))
            }
            (LogSinkType::File, Some(path)) => validate_path_string("logging.path", path),
            (LogSinkType::None | LogSinkType::Stderr, Some(_)) => Err(ConfigError::Invalid(
                "logging.path is only allowed with the file sink".to_string(),
            )),
            (LogSinkType::None | LogSinkType::Stderr, None) => Ok(()),
        }
    }

    /// Builds the configured ingest log sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the log file cannot be opened.
    pub fn build_sink(&self) -> Result<Arc<dyn IngestLogSink>, ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkType::File, Some(path)) => {
                let sink = FileIngestLogSink::new(path).map_err(|err| {
                    ConfigError::Io(format!("open log file {}: {err}", path.display()))
                })?;
                Ok(Arc::new(sink))
            }
            (LogSinkType::File, None) => {
                Err(ConfigError::Invalid("file logging requires logging.path".to_string()))
            }
            (LogSinkType::Stderr, _) => Ok(Arc::new(StderrIngestLogSink)),
            (LogSinkType::None, _) => Ok(Arc::new(NoopIngestLogSink)),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path against length constraints.
fn validate_path_string(field: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates the store database path.
fn validate_store_path(path: &Path) -> Result<(), ConfigError> {
    validate_path_string("store path", path)
}

/// Validates ingestion limits against core rules and config ceilings.
fn validate_ingest(ingest: &IngestConfig) -> Result<(), ConfigError> {
    ingest.validate().map_err(|err| ConfigError::Invalid(format!("ingest: {err}")))?;
    if ingest.max_payload_bytes > MAX_INGEST_PAYLOAD_BYTES {
        return Err(ConfigError::Invalid(format!(
            "ingest max_payload_bytes must not exceed {MAX_INGEST_PAYLOAD_BYTES}"
        )));
    }
    if ingest.max_datasets_per_event > MAX_INGEST_DATASETS_PER_EVENT {
        return Err(ConfigError::Invalid(format!(
            "ingest max_datasets_per_event must not exceed {MAX_INGEST_DATASETS_PER_EVENT}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions and helpers are permitted."
    )]

    use std::path::Path;
    use std::path::PathBuf;

    use super::ConfigError;
    use super::MAX_PATH_COMPONENT_LENGTH;
    use super::MAX_TOTAL_PATH_LENGTH;
    use super::validate_path;
    use super::validate_store_path;

    #[test]
    fn validate_path_rejects_long_component() {
        let component = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let path = PathBuf::from(component);
        let err = validate_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("component")));
    }

    #[test]
    fn validate_path_rejects_long_total() {
        let path = PathBuf::from("a/".repeat(MAX_TOTAL_PATH_LENGTH));
        let err = validate_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("max length")));
    }

    #[test]
    fn store_path_rejects_blank() {
        let err = validate_store_path(Path::new("  ")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("non-empty")));
    }
}
