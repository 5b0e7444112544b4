// crates/lineage-catalog-store-sqlite/src/tx.rs
// ============================================================================
// Module: SQLite Catalog Transaction
// Description: CatalogTx implementation over an open SQLite transaction.
// Purpose: Map catalog reads and conflict-safe inserts onto SQL statements.
// Dependencies: lineage-catalog-core, rusqlite
// ============================================================================

//! ## Overview
//! [`SqliteCatalogTx`] borrows the connection of a transaction opened by the
//! store and implements every [`CatalogTx`] operation as a single statement.
//! Keyed inserts use `ON CONFLICT DO NOTHING RETURNING` so a uniqueness clash
//! surfaces as `Ok(None)` instead of a constraint error.
//!
//! Timestamps are stored as unix microseconds, facet documents as compact
//! JSON text (NULL when empty), and enums as their stable integer codes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use lineage_catalog_core::AuditRequest;
use lineage_catalog_core::AuditRequestId;
use lineage_catalog_core::CatalogError;
use lineage_catalog_core::CatalogTx;
use lineage_catalog_core::Dataset;
use lineage_catalog_core::DatasetId;
use lineage_catalog_core::DatasetNamespace;
use lineage_catalog_core::DatasetNamespaceId;
use lineage_catalog_core::DatasetVersion;
use lineage_catalog_core::DatasetVersionId;
use lineage_catalog_core::EventType;
use lineage_catalog_core::ExternalRunId;
use lineage_catalog_core::FacetDocument;
use lineage_catalog_core::Field;
use lineage_catalog_core::FieldId;
use lineage_catalog_core::IoType;
use lineage_catalog_core::Job;
use lineage_catalog_core::JobId;
use lineage_catalog_core::JobNamespace;
use lineage_catalog_core::JobNamespaceId;
use lineage_catalog_core::JobVersion;
use lineage_catalog_core::JobVersionId;
use lineage_catalog_core::Namespace;
use lineage_catalog_core::NewDataset;
use lineage_catalog_core::NewDatasetVersion;
use lineage_catalog_core::NewEdge;
use lineage_catalog_core::NewField;
use lineage_catalog_core::NewJob;
use lineage_catalog_core::NewJobVersion;
use lineage_catalog_core::NewRun;
use lineage_catalog_core::NewRunEvent;
use lineage_catalog_core::Run;
use lineage_catalog_core::RunDatasetEdge;
use lineage_catalog_core::RunEventId;
use lineage_catalog_core::RunEventRecord;
use lineage_catalog_core::RunId;
use lineage_catalog_core::RunUpdate;
use lineage_catalog_core::Timestamp;
use lineage_catalog_core::core::facets::decode_facets;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Params;
use rusqlite::Row;
use rusqlite::params;
use rusqlite::types::Type;

// ============================================================================
// SECTION: Column Lists
// ============================================================================

/// Namespace columns in decode order.
const NAMESPACE_COLUMNS: &str = "id, name, created_at, updated_at";
/// Job columns in decode order.
const JOB_COLUMNS: &str =
    "id, namespace_id, name, current_version_id, facets, created_at, updated_at";
/// Job version columns in decode order.
const JOB_VERSION_COLUMNS: &str = "id, job_id, namespace_id, name, facets, created_at, updated_at";
/// Dataset columns in decode order.
const DATASET_COLUMNS: &str =
    "id, namespace_id, name, current_version_id, facets, created_at, updated_at";
/// Dataset version columns in decode order.
const DATASET_VERSION_COLUMNS: &str = "id, dataset_id, namespace_id, name, created_at, updated_at";
/// Field columns in decode order.
const FIELD_COLUMNS: &str = "id, dataset_version_id, name, data_type, description, created_at";
/// Run columns in decode order.
const RUN_COLUMNS: &str = "id, external_run_id, job_version_id, parent_run_id, facets, \
                           last_event_type, nominal_started_at, nominal_ended_at, started_at, \
                           ended_at, error_message, programming_language, stacktrace, \
                           created_at, updated_at";
/// Run event columns in decode order.
const RUN_EVENT_COLUMNS: &str = "id, run_id, event_type, event_time, facets, created_at";
/// Edge columns in decode order.
const EDGE_COLUMNS: &str =
    "run_id, dataset_version_id, io_type, io_facets, dataset_facets, created_at";

// ============================================================================
// SECTION: Transaction Scope
// ============================================================================

/// Catalog transaction scope over a borrowed `SQLite` connection.
///
/// The connection must have an open transaction for the lifetime of the
/// scope; the store commits or rolls it back after the work returns.
pub struct SqliteCatalogTx<'a> {
    /// Connection carrying the open transaction.
    conn: &'a Connection,
}

impl<'a> SqliteCatalogTx<'a> {
    /// Wraps a connection with an open transaction.
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
        }
    }

    /// Runs a single-row query, returning `None` when no row matches.
    fn fetch_optional<T, P, F>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
        map: F,
    ) -> Result<Option<T>, CatalogError>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.conn.query_row(sql, params, map).optional().map_err(|err| db_error(operation, err))
    }

    /// Runs a single-row query that must produce a row.
    fn fetch_one<T, P, F>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
        map: F,
    ) -> Result<T, CatalogError>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.conn.query_row(sql, params, map).map_err(|err| db_error(operation, err))
    }

    /// Runs a multi-row query.
    fn fetch_all<T, P, F>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
        map: F,
    ) -> Result<Vec<T>, CatalogError>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut statement = self.conn.prepare(sql).map_err(|err| db_error(operation, err))?;
        let rows = statement.query_map(params, map).map_err(|err| db_error(operation, err))?;
        rows.collect::<Result<Vec<T>, _>>().map_err(|err| db_error(operation, err))
    }
}

impl CatalogTx for SqliteCatalogTx<'_> {
    fn insert_audit_request(
        &mut self,
        payload: &[u8],
        created_at: Timestamp,
    ) -> Result<AuditRequestId, CatalogError> {
        self.fetch_one(
            "insert audit request",
            "INSERT INTO audit_requests (payload, created_at) VALUES (?1, ?2) RETURNING id",
            params![payload, created_at.unix_micros()],
            |row| column_id(row, 0, AuditRequestId::from_raw),
        )
    }

    fn audit_requests(&mut self) -> Result<Vec<AuditRequest>, CatalogError> {
        self.fetch_all(
            "list audit requests",
            "SELECT id, payload, created_at FROM audit_requests ORDER BY id",
            [],
            |row| {
                Ok(AuditRequest {
                    id: column_id(row, 0, AuditRequestId::from_raw)?,
                    payload: row.get(1)?,
                    created_at: column_time(row, 2)?,
                })
            },
        )
    }

    fn job_namespace_by_name(&mut self, name: &str) -> Result<Option<JobNamespace>, CatalogError> {
        self.fetch_optional(
            "load job namespace",
            &format!("SELECT {NAMESPACE_COLUMNS} FROM job_namespaces WHERE name = ?1"),
            params![name],
            |row| namespace_row(row, JobNamespaceId::from_raw),
        )
    }

    fn job_namespace(&mut self, id: JobNamespaceId) -> Result<Option<JobNamespace>, CatalogError> {
        self.fetch_optional(
            "load job namespace",
            &format!("SELECT {NAMESPACE_COLUMNS} FROM job_namespaces WHERE id = ?1"),
            params![key(id.get())?],
            |row| namespace_row(row, JobNamespaceId::from_raw),
        )
    }

    fn insert_job_namespace(
        &mut self,
        name: &str,
        created_at: Timestamp,
    ) -> Result<Option<JobNamespace>, CatalogError> {
        self.fetch_optional(
            "insert job namespace",
            &format!(
                "INSERT INTO job_namespaces (name, created_at) VALUES (?1, ?2) ON CONFLICT(name) \
                 DO NOTHING RETURNING {NAMESPACE_COLUMNS}"
            ),
            params![name, created_at.unix_micros()],
            |row| namespace_row(row, JobNamespaceId::from_raw),
        )
    }

    fn dataset_namespace_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<DatasetNamespace>, CatalogError> {
        self.fetch_optional(
            "load dataset namespace",
            &format!("SELECT {NAMESPACE_COLUMNS} FROM dataset_namespaces WHERE name = ?1"),
            params![name],
            |row| namespace_row(row, DatasetNamespaceId::from_raw),
        )
    }

    fn dataset_namespace(
        &mut self,
        id: DatasetNamespaceId,
    ) -> Result<Option<DatasetNamespace>, CatalogError> {
        self.fetch_optional(
            "load dataset namespace",
            &format!("SELECT {NAMESPACE_COLUMNS} FROM dataset_namespaces WHERE id = ?1"),
            params![key(id.get())?],
            |row| namespace_row(row, DatasetNamespaceId::from_raw),
        )
    }

    fn insert_dataset_namespace(
        &mut self,
        name: &str,
        created_at: Timestamp,
    ) -> Result<Option<DatasetNamespace>, CatalogError> {
        self.fetch_optional(
            "insert dataset namespace",
            &format!(
                "INSERT INTO dataset_namespaces (name, created_at) VALUES (?1, ?2) ON \
                 CONFLICT(name) DO NOTHING RETURNING {NAMESPACE_COLUMNS}"
            ),
            params![name, created_at.unix_micros()],
            |row| namespace_row(row, DatasetNamespaceId::from_raw),
        )
    }

    fn job_by_name(
        &mut self,
        namespace_id: JobNamespaceId,
        name: &str,
    ) -> Result<Option<Job>, CatalogError> {
        self.fetch_optional(
            "load job",
            &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE namespace_id = ?1 AND name = ?2"),
            params![key(namespace_id.get())?, name],
            job_row,
        )
    }

    fn job(&mut self, id: JobId) -> Result<Option<Job>, CatalogError> {
        self.fetch_optional(
            "load job",
            &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"),
            params![key(id.get())?],
            job_row,
        )
    }

    fn jobs(&mut self) -> Result<Vec<Job>, CatalogError> {
        self.fetch_all(
            "list jobs",
            &format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY id"),
            [],
            job_row,
        )
    }

    fn insert_job(&mut self, job: &NewJob<'_>) -> Result<Option<Job>, CatalogError> {
        self.fetch_optional(
            "insert job",
            &format!(
                "INSERT INTO jobs (namespace_id, name, facets, created_at) VALUES (?1, ?2, ?3, \
                 ?4) ON CONFLICT(namespace_id, name) DO NOTHING RETURNING {JOB_COLUMNS}"
            ),
            params![
                key(job.namespace_id.get())?,
                job.name,
                job.facets.encode_nullable(),
                job.created_at.unix_micros()
            ],
            job_row,
        )
    }

    fn update_job_facets(
        &mut self,
        id: JobId,
        facets: &FacetDocument,
        updated_at: Timestamp,
    ) -> Result<Job, CatalogError> {
        self.fetch_optional(
            "update job facets",
            &format!(
                "UPDATE jobs SET facets = ?2, updated_at = ?3 WHERE id = ?1 RETURNING {JOB_COLUMNS}"
            ),
            params![key(id.get())?, facets.encode_nullable(), updated_at.unix_micros()],
            job_row,
        )?
        .ok_or_else(|| CatalogError::not_found("job", id))
    }

    fn set_current_job_version(
        &mut self,
        id: JobId,
        version_id: JobVersionId,
        updated_at: Timestamp,
    ) -> Result<Job, CatalogError> {
        self.fetch_optional(
            "set current job version",
            &format!(
                "UPDATE jobs SET current_version_id = ?2, updated_at = ?3 WHERE id = ?1 \
                 RETURNING {JOB_COLUMNS}"
            ),
            params![key(id.get())?, key(version_id.get())?, updated_at.unix_micros()],
            job_row,
        )?
        .ok_or_else(|| CatalogError::not_found("job", id))
    }

    fn job_version(&mut self, id: JobVersionId) -> Result<Option<JobVersion>, CatalogError> {
        self.fetch_optional(
            "load job version",
            &format!("SELECT {JOB_VERSION_COLUMNS} FROM job_versions WHERE id = ?1"),
            params![key(id.get())?],
            job_version_row,
        )
    }

    fn job_versions(&mut self, job_id: JobId) -> Result<Vec<JobVersion>, CatalogError> {
        self.fetch_all(
            "list job versions",
            &format!("SELECT {JOB_VERSION_COLUMNS} FROM job_versions WHERE job_id = ?1 ORDER BY id"),
            params![key(job_id.get())?],
            job_version_row,
        )
    }

    fn insert_job_version(
        &mut self,
        version: &NewJobVersion<'_>,
    ) -> Result<JobVersion, CatalogError> {
        self.fetch_one(
            "insert job version",
            &format!(
                "INSERT INTO job_versions (job_id, namespace_id, name, facets, created_at) VALUES \
                 (?1, ?2, ?3, ?4, ?5) RETURNING {JOB_VERSION_COLUMNS}"
            ),
            params![
                key(version.job_id.get())?,
                key(version.namespace_id.get())?,
                version.name,
                version.facets.encode_nullable(),
                version.created_at.unix_micros()
            ],
            job_version_row,
        )
    }

    fn dataset_by_name(
        &mut self,
        namespace_id: DatasetNamespaceId,
        name: &str,
    ) -> Result<Option<Dataset>, CatalogError> {
        self.fetch_optional(
            "load dataset",
            &format!("SELECT {DATASET_COLUMNS} FROM datasets WHERE namespace_id = ?1 AND name = ?2"),
            params![key(namespace_id.get())?, name],
            dataset_row,
        )
    }

    fn dataset(&mut self, id: DatasetId) -> Result<Option<Dataset>, CatalogError> {
        self.fetch_optional(
            "load dataset",
            &format!("SELECT {DATASET_COLUMNS} FROM datasets WHERE id = ?1"),
            params![key(id.get())?],
            dataset_row,
        )
    }

    fn datasets(&mut self) -> Result<Vec<Dataset>, CatalogError> {
        self.fetch_all(
            "list datasets",
            &format!("SELECT {DATASET_COLUMNS} FROM datasets ORDER BY id"),
            [],
            dataset_row,
        )
    }

    fn insert_dataset(&mut self, dataset: &NewDataset<'_>) -> Result<Option<Dataset>, CatalogError> {
        self.fetch_optional(
            "insert dataset",
            &format!(
                "INSERT INTO datasets (namespace_id, name, facets, created_at) VALUES (?1, ?2, \
                 ?3, ?4) ON CONFLICT(namespace_id, name) DO NOTHING RETURNING {DATASET_COLUMNS}"
            ),
            params![
                key(dataset.namespace_id.get())?,
                dataset.name,
                dataset.facets.encode_nullable(),
                dataset.created_at.unix_micros()
            ],
            dataset_row,
        )
    }

    fn update_dataset_facets(
        &mut self,
        id: DatasetId,
        facets: &FacetDocument,
        updated_at: Timestamp,
    ) -> Result<Dataset, CatalogError> {
        self.fetch_optional(
            "update dataset facets",
            &format!(
                "UPDATE datasets SET facets = ?2, updated_at = ?3 WHERE id = ?1 RETURNING \
                 {DATASET_COLUMNS}"
            ),
            params![key(id.get())?, facets.encode_nullable(), updated_at.unix_micros()],
            dataset_row,
        )?
        .ok_or_else(|| CatalogError::not_found("dataset", id))
    }

    fn set_current_dataset_version(
        &mut self,
        id: DatasetId,
        version_id: DatasetVersionId,
        updated_at: Timestamp,
    ) -> Result<Dataset, CatalogError> {
        self.fetch_optional(
            "set current dataset version",
            &format!(
                "UPDATE datasets SET current_version_id = ?2, updated_at = ?3 WHERE id = ?1 \
                 RETURNING {DATASET_COLUMNS}"
            ),
            params![key(id.get())?, key(version_id.get())?, updated_at.unix_micros()],
            dataset_row,
        )?
        .ok_or_else(|| CatalogError::not_found("dataset", id))
    }

    fn dataset_version(
        &mut self,
        id: DatasetVersionId,
    ) -> Result<Option<DatasetVersion>, CatalogError> {
        self.fetch_optional(
            "load dataset version",
            &format!("SELECT {DATASET_VERSION_COLUMNS} FROM dataset_versions WHERE id = ?1"),
            params![key(id.get())?],
            dataset_version_row,
        )
    }

    fn dataset_versions(
        &mut self,
        dataset_id: DatasetId,
    ) -> Result<Vec<DatasetVersion>, CatalogError> {
        self.fetch_all(
            "list dataset versions",
            &format!(
                "SELECT {DATASET_VERSION_COLUMNS} FROM dataset_versions WHERE dataset_id = ?1 \
                 ORDER BY id"
            ),
            params![key(dataset_id.get())?],
            dataset_version_row,
        )
    }

    fn insert_dataset_version(
        &mut self,
        version: &NewDatasetVersion<'_>,
    ) -> Result<DatasetVersion, CatalogError> {
        self.fetch_one(
            "insert dataset version",
            &format!(
                "INSERT INTO dataset_versions (dataset_id, namespace_id, name, created_at) VALUES \
                 (?1, ?2, ?3, ?4) RETURNING {DATASET_VERSION_COLUMNS}"
            ),
            params![
                key(version.dataset_id.get())?,
                key(version.namespace_id.get())?,
                version.name,
                version.created_at.unix_micros()
            ],
            dataset_version_row,
        )
    }

    fn fields(&mut self, version_id: DatasetVersionId) -> Result<Vec<Field>, CatalogError> {
        self.fetch_all(
            "list fields",
            &format!("SELECT {FIELD_COLUMNS} FROM fields WHERE dataset_version_id = ?1 ORDER BY id"),
            params![key(version_id.get())?],
            field_row,
        )
    }

    fn insert_field(&mut self, field: &NewField<'_>) -> Result<Field, CatalogError> {
        self.fetch_one(
            "insert field",
            &format!(
                "INSERT INTO fields (dataset_version_id, name, data_type, description, \
                 created_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {FIELD_COLUMNS}"
            ),
            params![
                key(field.dataset_version_id.get())?,
                field.name,
                field.data_type,
                field.description,
                field.created_at.unix_micros()
            ],
            field_row,
        )
    }

    fn run_by_external_id(&mut self, id: &ExternalRunId) -> Result<Option<Run>, CatalogError> {
        self.fetch_optional(
            "load run",
            &format!("SELECT {RUN_COLUMNS} FROM runs WHERE external_run_id = ?1"),
            params![id.to_string()],
            run_row,
        )
    }

    fn run(&mut self, id: RunId) -> Result<Option<Run>, CatalogError> {
        self.fetch_optional(
            "load run",
            &format!("SELECT {RUN_COLUMNS} FROM runs WHERE id = ?1"),
            params![key(id.get())?],
            run_row,
        )
    }

    fn runs_for_job_version(&mut self, id: JobVersionId) -> Result<Vec<Run>, CatalogError> {
        self.fetch_all(
            "list runs",
            &format!("SELECT {RUN_COLUMNS} FROM runs WHERE job_version_id = ?1 ORDER BY id"),
            params![key(id.get())?],
            run_row,
        )
    }

    fn insert_run(&mut self, run: &NewRun<'_>) -> Result<Option<Run>, CatalogError> {
        let parent_run_id = run.parent_run_id.map(|id| key(id.get())).transpose()?;
        self.fetch_optional(
            "insert run",
            &format!(
                "INSERT INTO runs (external_run_id, job_version_id, parent_run_id, facets, \
                 nominal_started_at, nominal_ended_at, started_at, created_at) VALUES (?1, ?2, \
                 ?3, ?4, ?5, ?6, ?7, ?8) ON CONFLICT(external_run_id) DO NOTHING RETURNING \
                 {RUN_COLUMNS}"
            ),
            params![
                run.external_id.to_string(),
                key(run.job_version_id.get())?,
                parent_run_id,
                run.facets.encode_nullable(),
                run.nominal_started_at.map(Timestamp::unix_micros),
                run.nominal_ended_at.map(Timestamp::unix_micros),
                run.started_at.unix_micros(),
                run.created_at.unix_micros()
            ],
            run_row,
        )
    }

    fn update_run(&mut self, update: &RunUpdate<'_>) -> Result<Run, CatalogError> {
        self.fetch_optional(
            "update run",
            &format!(
                "UPDATE runs SET facets = ?2, ended_at = ?3, last_event_type = ?4, error_message \
                 = ?5, programming_language = ?6, stacktrace = ?7, updated_at = ?8 WHERE id = ?1 \
                 RETURNING {RUN_COLUMNS}"
            ),
            params![
                key(update.id.get())?,
                update.facets.encode_nullable(),
                update.ended_at.map(Timestamp::unix_micros),
                update.last_event_type.code(),
                update.error_message,
                update.programming_language,
                update.stacktrace,
                update.updated_at.unix_micros()
            ],
            run_row,
        )?
        .ok_or_else(|| CatalogError::not_found("run", update.id))
    }

    fn insert_run_event(
        &mut self,
        event: &NewRunEvent<'_>,
    ) -> Result<RunEventRecord, CatalogError> {
        self.fetch_one(
            "insert run event",
            &format!(
                "INSERT INTO run_events (run_id, event_type, event_time, facets, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {RUN_EVENT_COLUMNS}"
            ),
            params![
                key(event.run_id.get())?,
                event.event_type.code(),
                event.event_time.unix_micros(),
                event.facets.encode_nullable(),
                event.created_at.unix_micros()
            ],
            run_event_row,
        )
    }

    fn run_events(&mut self, run_id: RunId) -> Result<Vec<RunEventRecord>, CatalogError> {
        self.fetch_all(
            "list run events",
            &format!(
                "SELECT {RUN_EVENT_COLUMNS} FROM run_events WHERE run_id = ?1 ORDER BY \
                 event_time, id"
            ),
            params![key(run_id.get())?],
            run_event_row,
        )
    }

    fn edge(
        &mut self,
        run_id: RunId,
        version_id: DatasetVersionId,
    ) -> Result<Option<RunDatasetEdge>, CatalogError> {
        self.fetch_optional(
            "load edge",
            &format!(
                "SELECT {EDGE_COLUMNS} FROM run_dataset_edges WHERE run_id = ?1 AND \
                 dataset_version_id = ?2"
            ),
            params![key(run_id.get())?, key(version_id.get())?],
            edge_row,
        )
    }

    fn insert_edge(&mut self, edge: &NewEdge<'_>) -> Result<Option<RunDatasetEdge>, CatalogError> {
        self.fetch_optional(
            "insert edge",
            &format!(
                "INSERT INTO run_dataset_edges (run_id, dataset_version_id, io_type, io_facets, \
                 dataset_facets, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) ON CONFLICT(run_id, \
                 dataset_version_id) DO NOTHING RETURNING {EDGE_COLUMNS}"
            ),
            params![
                key(edge.run_id.get())?,
                key(edge.dataset_version_id.get())?,
                edge.io_type.code(),
                edge.io_facets.encode_nullable(),
                edge.dataset_facets.encode_nullable(),
                edge.created_at.unix_micros()
            ],
            edge_row,
        )
    }

    fn edges_for_run(&mut self, run_id: RunId) -> Result<Vec<RunDatasetEdge>, CatalogError> {
        self.fetch_all(
            "list edges",
            &format!("SELECT {EDGE_COLUMNS} FROM run_dataset_edges WHERE run_id = ?1 ORDER BY id"),
            params![key(run_id.get())?],
            edge_row,
        )
    }

    fn latest_edge_for_dataset_version(
        &mut self,
        version_id: DatasetVersionId,
    ) -> Result<Option<RunDatasetEdge>, CatalogError> {
        self.fetch_optional(
            "load latest edge",
            &format!(
                "SELECT {EDGE_COLUMNS} FROM run_dataset_edges WHERE dataset_version_id = ?1 \
                 ORDER BY id DESC LIMIT 1"
            ),
            params![key(version_id.get())?],
            edge_row,
        )
    }
}

// ============================================================================
// SECTION: Row Decoders
// ============================================================================

/// Decodes a namespace row.
fn namespace_row<I>(row: &Row<'_>, ctor: fn(u64) -> Option<I>) -> rusqlite::Result<Namespace<I>> {
    Ok(Namespace {
        id: column_id(row, 0, ctor)?,
        name: row.get(1)?,
        created_at: column_time(row, 2)?,
        updated_at: column_opt_time(row, 3)?,
    })
}

/// Decodes a job row.
fn job_row(row: &Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: column_id(row, 0, JobId::from_raw)?,
        namespace_id: column_id(row, 1, JobNamespaceId::from_raw)?,
        name: row.get(2)?,
        current_version_id: column_opt_id(row, 3, JobVersionId::from_raw)?,
        facets: column_facets(row, 4)?,
        created_at: column_time(row, 5)?,
        updated_at: column_opt_time(row, 6)?,
    })
}

/// Decodes a job version row.
fn job_version_row(row: &Row<'_>) -> rusqlite::Result<JobVersion> {
    Ok(JobVersion {
        id: column_id(row, 0, JobVersionId::from_raw)?,
        job_id: column_id(row, 1, JobId::from_raw)?,
        namespace_id: column_id(row, 2, JobNamespaceId::from_raw)?,
        name: row.get(3)?,
        facets: column_facets(row, 4)?,
        created_at: column_time(row, 5)?,
        updated_at: column_opt_time(row, 6)?,
    })
}

/// Decodes a dataset row.
fn dataset_row(row: &Row<'_>) -> rusqlite::Result<Dataset> {
    Ok(Dataset {
        id: column_id(row, 0, DatasetId::from_raw)?,
        namespace_id: column_id(row, 1, DatasetNamespaceId::from_raw)?,
        name: row.get(2)?,
        current_version_id: column_opt_id(row, 3, DatasetVersionId::from_raw)?,
        facets: column_facets(row, 4)?,
        created_at: column_time(row, 5)?,
        updated_at: column_opt_time(row, 6)?,
    })
}

/// Decodes a dataset version row.
fn dataset_version_row(row: &Row<'_>) -> rusqlite::Result<DatasetVersion> {
    Ok(DatasetVersion {
        id: column_id(row, 0, DatasetVersionId::from_raw)?,
        dataset_id: column_id(row, 1, DatasetId::from_raw)?,
        namespace_id: column_id(row, 2, DatasetNamespaceId::from_raw)?,
        name: row.get(3)?,
        created_at: column_time(row, 4)?,
        updated_at: column_opt_time(row, 5)?,
    })
}

/// Decodes a field row.
fn field_row(row: &Row<'_>) -> rusqlite::Result<Field> {
    Ok(Field {
        id: column_id(row, 0, FieldId::from_raw)?,
        dataset_version_id: column_id(row, 1, DatasetVersionId::from_raw)?,
        name: row.get(2)?,
        data_type: row.get(3)?,
        description: row.get(4)?,
        created_at: column_time(row, 5)?,
    })
}

/// Decodes a run row.
fn run_row(row: &Row<'_>) -> rusqlite::Result<Run> {
    Ok(Run {
        id: column_id(row, 0, RunId::from_raw)?,
        external_id: column_external_id(row, 1)?,
        job_version_id: column_id(row, 2, JobVersionId::from_raw)?,
        parent_run_id: column_opt_id(row, 3, RunId::from_raw)?,
        facets: column_facets(row, 4)?,
        last_event_type: column_opt_event_type(row, 5)?,
        nominal_started_at: column_opt_time(row, 6)?,
        nominal_ended_at: column_opt_time(row, 7)?,
        started_at: column_time(row, 8)?,
        ended_at: column_opt_time(row, 9)?,
        error_message: row.get(10)?,
        programming_language: row.get(11)?,
        stacktrace: row.get(12)?,
        created_at: column_time(row, 13)?,
        updated_at: column_opt_time(row, 14)?,
    })
}

/// Decodes a run event row.
fn run_event_row(row: &Row<'_>) -> rusqlite::Result<RunEventRecord> {
    Ok(RunEventRecord {
        id: column_id(row, 0, RunEventId::from_raw)?,
        run_id: column_id(row, 1, RunId::from_raw)?,
        event_type: column_event_type(row, 2)?,
        event_time: column_time(row, 3)?,
        facets: column_facets(row, 4)?,
        created_at: column_time(row, 5)?,
    })
}

/// Decodes an edge row.
fn edge_row(row: &Row<'_>) -> rusqlite::Result<RunDatasetEdge> {
    let raw: i64 = row.get(2)?;
    Ok(RunDatasetEdge {
        run_id: column_id(row, 0, RunId::from_raw)?,
        dataset_version_id: column_id(row, 1, DatasetVersionId::from_raw)?,
        io_type: IoType::from_code(raw).ok_or(rusqlite::Error::IntegralValueOutOfRange(2, raw))?,
        io_facets: column_facets(row, 3)?,
        dataset_facets: column_facets(row, 4)?,
        created_at: column_time(row, 5)?,
    })
}

// ============================================================================
// SECTION: Column Helpers
// ============================================================================

/// Decodes a surrogate id column.
fn column_id<I>(row: &Row<'_>, idx: usize, ctor: fn(u64) -> Option<I>) -> rusqlite::Result<I> {
    let raw: i64 = row.get(idx)?;
    u64::try_from(raw)
        .ok()
        .and_then(ctor)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, raw))
}

/// Decodes a nullable surrogate id column.
fn column_opt_id<I>(
    row: &Row<'_>,
    idx: usize,
    ctor: fn(u64) -> Option<I>,
) -> rusqlite::Result<Option<I>> {
    let raw: Option<i64> = row.get(idx)?;
    raw.map(|raw| {
        u64::try_from(raw)
            .ok()
            .and_then(ctor)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, raw))
    })
    .transpose()
}

/// Decodes a unix-microsecond timestamp column.
fn column_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    let raw: i64 = row.get(idx)?;
    Timestamp::from_unix_micros(raw).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, raw))
}

/// Decodes a nullable unix-microsecond timestamp column.
fn column_opt_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Timestamp>> {
    let raw: Option<i64> = row.get(idx)?;
    raw.map(|raw| {
        Timestamp::from_unix_micros(raw).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, raw))
    })
    .transpose()
}

/// Decodes a nullable facet document column.
fn column_facets(row: &Row<'_>, idx: usize) -> rusqlite::Result<FacetDocument> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        None => Ok(FacetDocument::new()),
        Some(text) => {
            decode_facets(text.as_bytes()).map_err(|err| conversion_failure(idx, Type::Text, err))
        }
    }
}

/// Decodes an event type code column.
fn column_event_type(row: &Row<'_>, idx: usize) -> rusqlite::Result<EventType> {
    let raw: i64 = row.get(idx)?;
    EventType::from_code(raw).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, raw))
}

/// Decodes a nullable event type code column.
fn column_opt_event_type(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<EventType>> {
    let raw: Option<i64> = row.get(idx)?;
    raw.map(|raw| EventType::from_code(raw).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, raw)))
        .transpose()
}

/// Decodes an external run id column.
fn column_external_id(row: &Row<'_>, idx: usize) -> rusqlite::Result<ExternalRunId> {
    let raw: String = row.get(idx)?;
    ExternalRunId::parse(&raw).map_err(|err| conversion_failure(idx, Type::Text, err))
}

/// Wraps a catalog decode error as a column conversion failure.
fn conversion_failure(idx: usize, column_type: Type, err: CatalogError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, column_type, Box::new(err))
}

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

/// Converts a surrogate id to its `SQLite` integer key.
fn key(raw: u64) -> Result<i64, CatalogError> {
    i64::try_from(raw)
        .map_err(|_| CatalogError::Validation(format!("identifier out of range: {raw}")))
}

/// Maps an engine error onto the catalog taxonomy.
///
/// Column decode failures that carry a [`CatalogError`] surface unchanged so
/// malformed stored facets report as serialization errors.
pub(crate) fn db_error(operation: &'static str, err: rusqlite::Error) -> CatalogError {
    if let rusqlite::Error::FromSqlConversionFailure(_, _, source) = &err
        && let Some(catalog) = source.downcast_ref::<CatalogError>()
    {
        return catalog.clone();
    }
    CatalogError::persistence(operation, err)
}
