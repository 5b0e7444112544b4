// crates/lineage-catalog-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Catalog Store
// Description: Durable CatalogStore backed by SQLite WAL.
// Purpose: Persist the lineage catalog with one transaction per event.
// Dependencies: lineage-catalog-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`CatalogStore`] using `SQLite`. Each unit
//! of work runs inside one `BEGIN IMMEDIATE` transaction that commits when the
//! work succeeds and rolls back otherwise. Writers on other connections
//! serialize on the database write lock; writers sharing this store serialize
//! on the connection mutex.
//! Security posture: database contents are untrusted and decoded fail-closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use lineage_catalog_core::CatalogError;
use lineage_catalog_core::CatalogStore;
use lineage_catalog_core::CatalogTx;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::tx::SqliteCatalogTx;
use crate::tx::db_error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
pub const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Catalog schema applied on first open.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS audit_requests (
    id INTEGER PRIMARY KEY,
    payload BLOB NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS job_namespaces (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);
CREATE TABLE IF NOT EXISTS dataset_namespaces (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY,
    namespace_id INTEGER NOT NULL REFERENCES job_namespaces(id),
    name TEXT NOT NULL,
    current_version_id INTEGER REFERENCES job_versions(id),
    facets TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER,
    UNIQUE (namespace_id, name)
);
CREATE TABLE IF NOT EXISTS job_versions (
    id INTEGER PRIMARY KEY,
    job_id INTEGER NOT NULL REFERENCES jobs(id),
    namespace_id INTEGER NOT NULL REFERENCES job_namespaces(id),
    name TEXT NOT NULL,
    facets TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);
CREATE TABLE IF NOT EXISTS datasets (
    id INTEGER PRIMARY KEY,
    namespace_id INTEGER NOT NULL REFERENCES dataset_namespaces(id),
    name TEXT NOT NULL,
    current_version_id INTEGER REFERENCES dataset_versions(id),
    facets TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER,
    UNIQUE (namespace_id, name)
);
CREATE TABLE IF NOT EXISTS dataset_versions (
    id INTEGER PRIMARY KEY,
    dataset_id INTEGER NOT NULL REFERENCES datasets(id),
    namespace_id INTEGER NOT NULL REFERENCES dataset_namespaces(id),
    name TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);
CREATE TABLE IF NOT EXISTS fields (
    id INTEGER PRIMARY KEY,
    dataset_version_id INTEGER NOT NULL REFERENCES dataset_versions(id),
    name TEXT NOT NULL,
    data_type TEXT NOT NULL,
    description TEXT,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY,
    external_run_id TEXT NOT NULL UNIQUE,
    job_version_id INTEGER NOT NULL REFERENCES job_versions(id),
    parent_run_id INTEGER REFERENCES runs(id),
    facets TEXT,
    last_event_type INTEGER,
    nominal_started_at INTEGER,
    nominal_ended_at INTEGER,
    started_at INTEGER NOT NULL,
    ended_at INTEGER,
    error_message TEXT,
    programming_language TEXT,
    stacktrace TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);
CREATE TABLE IF NOT EXISTS run_events (
    id INTEGER PRIMARY KEY,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    event_type INTEGER NOT NULL,
    event_time INTEGER NOT NULL,
    facets TEXT,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS run_dataset_edges (
    id INTEGER PRIMARY KEY,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    dataset_version_id INTEGER NOT NULL REFERENCES dataset_versions(id),
    io_type INTEGER NOT NULL,
    io_facets TEXT,
    dataset_facets TEXT,
    created_at INTEGER NOT NULL,
    UNIQUE (run_id, dataset_version_id)
);
CREATE INDEX IF NOT EXISTS idx_job_versions_job_id ON job_versions (job_id);
CREATE INDEX IF NOT EXISTS idx_dataset_versions_dataset_id ON dataset_versions (dataset_id);
CREATE INDEX IF NOT EXISTS idx_fields_dataset_version_id ON fields (dataset_version_id);
CREATE INDEX IF NOT EXISTS idx_runs_job_version_id ON runs (job_version_id);
CREATE INDEX IF NOT EXISTS idx_run_events_run_id ON run_events (run_id, event_time, id);
CREATE INDEX IF NOT EXISTS idx_run_dataset_edges_version
    ON run_dataset_edges (dataset_version_id);
";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` catalog store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Returns a configuration with defaults for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors raised while opening the store.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store configuration or data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for CatalogError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::persistence("open store", message),
            SqliteStoreError::Db(message) => Self::persistence("open store", message),
            SqliteStoreError::VersionMismatch(message) => {
                Self::persistence("check schema version", message)
            }
            SqliteStoreError::Invalid(message) => Self::Validation(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed lineage catalog store with WAL support.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    /// Opens an `SQLite`-backed catalog store, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or when it carries a different schema version.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Runs `work` inside a transaction opened with `behavior`.
    fn with_transaction<T, F>(
        &self,
        behavior: TransactionBehavior,
        commit: bool,
        work: F,
    ) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut dyn CatalogTx) -> Result<T, CatalogError>,
    {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| CatalogError::persistence("lock connection", "mutex poisoned"))?;
        let tx = guard
            .transaction_with_behavior(behavior)
            .map_err(|err| db_error("begin transaction", err))?;
        let value = work(&mut SqliteCatalogTx::new(&tx))?;
        if commit {
            tx.commit().map_err(|err| db_error("commit transaction", err))?;
        } else {
            tx.rollback().map_err(|err| db_error("end read transaction", err))?;
        }
        drop(guard);
        Ok(value)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn transact<T, F>(&self, work: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut dyn CatalogTx) -> Result<T, CatalogError>,
    {
        self.with_transaction(TransactionBehavior::Immediate, true, work)
    }

    fn read<T, F>(&self, work: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut dyn CatalogTx) -> Result<T, CatalogError>,
    {
        self.with_transaction(TransactionBehavior::Deferred, false, work)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability and integrity.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(SCHEMA_SQL).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
