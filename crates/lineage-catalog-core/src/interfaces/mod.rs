// crates/lineage-catalog-core/src/interfaces/mod.rs
// ============================================================================
// Module: Lineage Catalog Interfaces
// Description: Backend-agnostic store traits and the catalog error taxonomy.
// Purpose: Define the transactional seam every catalog backend implements.
// Dependencies: thiserror, crate::core
// ============================================================================

//! ## Overview
//! The ingestion engine talks to storage only through [`CatalogTx`], a single
//! transactional scope object handed to every component for the duration of
//! one unit of work. [`CatalogStore`] opens those scopes: `transact` commits
//! when the work returns `Ok` and discards everything otherwise.
//!
//! Inserts on keyed entities are conflict-safe. They return `Ok(None)` when
//! the uniqueness key already exists so callers can re-fetch the winner
//! instead of producing a duplicate row.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::AuditRequest;
use crate::core::AuditRequestId;
use crate::core::Dataset;
use crate::core::DatasetId;
use crate::core::DatasetNamespace;
use crate::core::DatasetNamespaceId;
use crate::core::DatasetVersion;
use crate::core::DatasetVersionId;
use crate::core::ExternalRunId;
use crate::core::FacetDocument;
use crate::core::Field;
use crate::core::Job;
use crate::core::JobId;
use crate::core::JobNamespace;
use crate::core::JobNamespaceId;
use crate::core::JobVersion;
use crate::core::JobVersionId;
use crate::core::NewDataset;
use crate::core::NewDatasetVersion;
use crate::core::NewEdge;
use crate::core::NewField;
use crate::core::NewJob;
use crate::core::NewJobVersion;
use crate::core::NewRun;
use crate::core::NewRunEvent;
use crate::core::Run;
use crate::core::RunDatasetEdge;
use crate::core::RunEventRecord;
use crate::core::RunId;
use crate::core::RunUpdate;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog errors surfaced by ingestion and read operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Inbound data failed validation.
    #[error("validation error: {0}")]
    Validation(String),
    /// A referenced entity does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// Lookup key.
        key: String,
    },
    /// A facet or payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The backing store failed.
    #[error("persistence error during {operation}: {message}")]
    Persistence {
        /// Store operation that failed.
        operation: &'static str,
        /// Store error message.
        message: String,
    },
    /// A concurrent writer created the same key and it could not be re-read.
    #[error("{entity} conflict: {key}")]
    Conflict {
        /// Entity kind.
        entity: &'static str,
        /// Conflicting key.
        key: String,
    },
    /// The caller cancelled the unit of work.
    #[error("ingestion cancelled")]
    Cancelled,
}

impl CatalogError {
    /// Builds a not-found error.
    #[must_use]
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Builds a persistence error.
    #[must_use]
    pub fn persistence(operation: &'static str, message: impl ToString) -> Self {
        Self::Persistence {
            operation,
            message: message.to_string(),
        }
    }

    /// Returns a stable label for logs and exit codes.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound {
                ..
            } => "not_found",
            Self::Serialization(_) => "serialization",
            Self::Persistence {
                ..
            } => "persistence",
            Self::Conflict {
                ..
            } => "conflict",
            Self::Cancelled => "cancelled",
        }
    }
}

// ============================================================================
// SECTION: Transaction Scope
// ============================================================================

/// Operations available inside one catalog transaction.
///
/// Every method observes the writes made earlier in the same transaction.
/// Listing methods return rows ordered by surrogate id unless noted.
pub trait CatalogTx {
    // ---------------------------------------------------------------- audit

    /// Appends a raw request payload.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn insert_audit_request(
        &mut self,
        payload: &[u8],
        created_at: Timestamp,
    ) -> Result<AuditRequestId, CatalogError>;

    /// Lists every audit request.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn audit_requests(&mut self) -> Result<Vec<AuditRequest>, CatalogError>;

    // ----------------------------------------------------------- namespaces

    /// Looks up a job namespace by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn job_namespace_by_name(&mut self, name: &str) -> Result<Option<JobNamespace>, CatalogError>;

    /// Looks up a job namespace by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn job_namespace(&mut self, id: JobNamespaceId) -> Result<Option<JobNamespace>, CatalogError>;

    /// Inserts a job namespace; `None` when the name already exists.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn insert_job_namespace(
        &mut self,
        name: &str,
        created_at: Timestamp,
    ) -> Result<Option<JobNamespace>, CatalogError>;

    /// Looks up a dataset namespace by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn dataset_namespace_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<DatasetNamespace>, CatalogError>;

    /// Looks up a dataset namespace by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn dataset_namespace(
        &mut self,
        id: DatasetNamespaceId,
    ) -> Result<Option<DatasetNamespace>, CatalogError>;

    /// Inserts a dataset namespace; `None` when the name already exists.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn insert_dataset_namespace(
        &mut self,
        name: &str,
        created_at: Timestamp,
    ) -> Result<Option<DatasetNamespace>, CatalogError>;

    // ----------------------------------------------------------------- jobs

    /// Looks up a job by namespace and name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn job_by_name(
        &mut self,
        namespace_id: JobNamespaceId,
        name: &str,
    ) -> Result<Option<Job>, CatalogError>;

    /// Looks up a job by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn job(&mut self, id: JobId) -> Result<Option<Job>, CatalogError>;

    /// Lists every job.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn jobs(&mut self) -> Result<Vec<Job>, CatalogError>;

    /// Inserts a job; `None` when `(namespace, name)` already exists.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn insert_job(&mut self, job: &NewJob<'_>) -> Result<Option<Job>, CatalogError>;

    /// Replaces the stored facets of a job.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the job does not exist.
    fn update_job_facets(
        &mut self,
        id: JobId,
        facets: &FacetDocument,
        updated_at: Timestamp,
    ) -> Result<Job, CatalogError>;

    /// Points a job at a version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the job does not exist.
    fn set_current_job_version(
        &mut self,
        id: JobId,
        version_id: JobVersionId,
        updated_at: Timestamp,
    ) -> Result<Job, CatalogError>;

    /// Looks up a job version by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn job_version(&mut self, id: JobVersionId) -> Result<Option<JobVersion>, CatalogError>;

    /// Lists the versions of a job.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn job_versions(&mut self, job_id: JobId) -> Result<Vec<JobVersion>, CatalogError>;

    /// Inserts a job version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn insert_job_version(
        &mut self,
        version: &NewJobVersion<'_>,
    ) -> Result<JobVersion, CatalogError>;

    // ------------------------------------------------------------- datasets

    /// Looks up a dataset by namespace and name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn dataset_by_name(
        &mut self,
        namespace_id: DatasetNamespaceId,
        name: &str,
    ) -> Result<Option<Dataset>, CatalogError>;

    /// Looks up a dataset by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn dataset(&mut self, id: DatasetId) -> Result<Option<Dataset>, CatalogError>;

    /// Lists every dataset.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn datasets(&mut self) -> Result<Vec<Dataset>, CatalogError>;

    /// Inserts a dataset; `None` when `(namespace, name)` already exists.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn insert_dataset(&mut self, dataset: &NewDataset<'_>) -> Result<Option<Dataset>, CatalogError>;

    /// Replaces the stored facets of a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the dataset does not exist.
    fn update_dataset_facets(
        &mut self,
        id: DatasetId,
        facets: &FacetDocument,
        updated_at: Timestamp,
    ) -> Result<Dataset, CatalogError>;

    /// Points a dataset at a version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the dataset does not exist.
    fn set_current_dataset_version(
        &mut self,
        id: DatasetId,
        version_id: DatasetVersionId,
        updated_at: Timestamp,
    ) -> Result<Dataset, CatalogError>;

    /// Looks up a dataset version by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn dataset_version(
        &mut self,
        id: DatasetVersionId,
    ) -> Result<Option<DatasetVersion>, CatalogError>;

    /// Lists the versions of a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn dataset_versions(&mut self, dataset_id: DatasetId)
    -> Result<Vec<DatasetVersion>, CatalogError>;

    /// Inserts a dataset version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn insert_dataset_version(
        &mut self,
        version: &NewDatasetVersion<'_>,
    ) -> Result<DatasetVersion, CatalogError>;

    /// Lists the fields of a dataset version in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn fields(&mut self, version_id: DatasetVersionId) -> Result<Vec<Field>, CatalogError>;

    /// Appends a field to a dataset version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn insert_field(&mut self, field: &NewField<'_>) -> Result<Field, CatalogError>;

    // ----------------------------------------------------------------- runs

    /// Looks up a run by its external id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn run_by_external_id(&mut self, id: &ExternalRunId) -> Result<Option<Run>, CatalogError>;

    /// Looks up a run by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn run(&mut self, id: RunId) -> Result<Option<Run>, CatalogError>;

    /// Lists the runs of a job version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn runs_for_job_version(&mut self, id: JobVersionId) -> Result<Vec<Run>, CatalogError>;

    /// Inserts a run; `None` when the external id already exists.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn insert_run(&mut self, run: &NewRun<'_>) -> Result<Option<Run>, CatalogError>;

    /// Applies an event projection to a run.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the run does not exist.
    fn update_run(&mut self, update: &RunUpdate<'_>) -> Result<Run, CatalogError>;

    /// Appends a run event.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn insert_run_event(&mut self, event: &NewRunEvent<'_>)
    -> Result<RunEventRecord, CatalogError>;

    /// Lists the events of a run ordered by event time, then id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn run_events(&mut self, run_id: RunId) -> Result<Vec<RunEventRecord>, CatalogError>;

    // ---------------------------------------------------------------- edges

    /// Looks up the edge for a run and dataset version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn edge(
        &mut self,
        run_id: RunId,
        version_id: DatasetVersionId,
    ) -> Result<Option<RunDatasetEdge>, CatalogError>;

    /// Inserts an edge; `None` when the pair already exists.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn insert_edge(&mut self, edge: &NewEdge<'_>) -> Result<Option<RunDatasetEdge>, CatalogError>;

    /// Lists the edges of a run in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn edges_for_run(&mut self, run_id: RunId) -> Result<Vec<RunDatasetEdge>, CatalogError>;

    /// Returns the most recently created edge for a dataset version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    fn latest_edge_for_dataset_version(
        &mut self,
        version_id: DatasetVersionId,
    ) -> Result<Option<RunDatasetEdge>, CatalogError>;
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Factory for catalog transactions.
pub trait CatalogStore: Send + Sync {
    /// Runs `work` inside one write transaction.
    ///
    /// The transaction commits when `work` returns `Ok` and rolls back
    /// otherwise; no partial state is ever visible.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or [`CatalogError::Persistence`]
    /// when the transaction cannot begin or commit.
    fn transact<T, F>(&self, work: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut dyn CatalogTx) -> Result<T, CatalogError>;

    /// Runs `work` inside a read transaction that never commits mutations.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or [`CatalogError::Persistence`]
    /// when the transaction cannot begin.
    fn read<T, F>(&self, work: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut dyn CatalogTx) -> Result<T, CatalogError>;
}

impl<S: CatalogStore> CatalogStore for std::sync::Arc<S> {
    fn transact<T, F>(&self, work: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut dyn CatalogTx) -> Result<T, CatalogError>,
    {
        self.as_ref().transact(work)
    }

    fn read<T, F>(&self, work: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut dyn CatalogTx) -> Result<T, CatalogError>,
    {
        self.as_ref().read(work)
    }
}
