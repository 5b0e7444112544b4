// crates/lineage-catalog-core/src/runtime/queries.rs
// ============================================================================
// Module: Catalog Queries
// Description: Read-side lookups over any catalog store.
// Purpose: Serve browsing and provenance lookups with fully joined records.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Each query runs inside one read transaction so joined projections are
//! consistent. Lookups keyed by an id fail with [`CatalogError::NotFound`]
//! when the id does not exist, including list queries scoped to a parent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AuditRequest;
use crate::core::DatasetId;
use crate::core::DatasetNamespace;
use crate::core::DatasetNamespaceId;
use crate::core::DatasetVersion;
use crate::core::DatasetVersionId;
use crate::core::DatasetWithNamespace;
use crate::core::EdgeWithDataset;
use crate::core::ExternalRunId;
use crate::core::FacetDocument;
use crate::core::Field;
use crate::core::JobId;
use crate::core::JobNamespace;
use crate::core::JobNamespaceId;
use crate::core::JobVersion;
use crate::core::JobVersionId;
use crate::core::JobWithNamespace;
use crate::core::Run;
use crate::core::RunEventRecord;
use crate::core::RunId;
use crate::interfaces::CatalogError;
use crate::interfaces::CatalogStore;
use crate::interfaces::CatalogTx;

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Read-side query surface over a catalog store.
pub struct CatalogQueries<'a, S> {
    /// Store queried by every lookup.
    store: &'a S,
}

impl<'a, S: CatalogStore> CatalogQueries<'a, S> {
    /// Creates a query surface over `store`.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
        }
    }

    /// Lists every job with its namespace.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    pub fn list_jobs(&self) -> Result<Vec<JobWithNamespace>, CatalogError> {
        self.store.read(|tx| {
            let jobs = tx.jobs()?;
            jobs.into_iter()
                .map(|job| -> Result<JobWithNamespace, CatalogError> {
                    let namespace = require_job_namespace(tx, job.namespace_id)?;
                    Ok(JobWithNamespace {
                        job,
                        namespace,
                    })
                })
                .collect()
        })
    }

    /// Returns a job with its namespace.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the job does not exist.
    pub fn get_job(&self, id: JobId) -> Result<JobWithNamespace, CatalogError> {
        self.store.read(|tx| {
            let job = tx.job(id)?.ok_or_else(|| CatalogError::not_found("job", id))?;
            let namespace = require_job_namespace(tx, job.namespace_id)?;
            Ok(JobWithNamespace {
                job,
                namespace,
            })
        })
    }

    /// Lists the versions of a job.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the job does not exist.
    pub fn list_job_versions(&self, id: JobId) -> Result<Vec<JobVersion>, CatalogError> {
        self.store.read(|tx| {
            tx.job(id)?.ok_or_else(|| CatalogError::not_found("job", id))?;
            tx.job_versions(id)
        })
    }

    /// Returns a job version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the version does not exist.
    pub fn get_job_version(&self, id: JobVersionId) -> Result<JobVersion, CatalogError> {
        self.store.read(|tx| {
            tx.job_version(id)?.ok_or_else(|| CatalogError::not_found("job version", id))
        })
    }

    /// Lists the runs of a job version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the version does not exist.
    pub fn list_runs_for_job_version(&self, id: JobVersionId) -> Result<Vec<Run>, CatalogError> {
        self.store.read(|tx| {
            tx.job_version(id)?.ok_or_else(|| CatalogError::not_found("job version", id))?;
            tx.runs_for_job_version(id)
        })
    }

    /// Lists every dataset with its namespace.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    pub fn list_datasets(&self) -> Result<Vec<DatasetWithNamespace>, CatalogError> {
        self.store.read(|tx| {
            let datasets = tx.datasets()?;
            datasets
                .into_iter()
                .map(|dataset| -> Result<DatasetWithNamespace, CatalogError> {
                    let namespace = require_dataset_namespace(tx, dataset.namespace_id)?;
                    Ok(DatasetWithNamespace {
                        dataset,
                        namespace,
                    })
                })
                .collect()
        })
    }

    /// Returns a dataset with its namespace.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the dataset does not exist.
    pub fn get_dataset(&self, id: DatasetId) -> Result<DatasetWithNamespace, CatalogError> {
        self.store.read(|tx| {
            let dataset = tx.dataset(id)?.ok_or_else(|| CatalogError::not_found("dataset", id))?;
            let namespace = require_dataset_namespace(tx, dataset.namespace_id)?;
            Ok(DatasetWithNamespace {
                dataset,
                namespace,
            })
        })
    }

    /// Lists the versions of a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the dataset does not exist.
    pub fn list_dataset_versions(
        &self,
        id: DatasetId,
    ) -> Result<Vec<DatasetVersion>, CatalogError> {
        self.store.read(|tx| {
            tx.dataset(id)?.ok_or_else(|| CatalogError::not_found("dataset", id))?;
            tx.dataset_versions(id)
        })
    }

    /// Returns a dataset version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the version does not exist.
    pub fn get_dataset_version(
        &self,
        id: DatasetVersionId,
    ) -> Result<DatasetVersion, CatalogError> {
        self.store.read(|tx| require_dataset_version(tx, id))
    }

    /// Lists the fields of a dataset version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the version does not exist.
    pub fn list_fields(&self, id: DatasetVersionId) -> Result<Vec<Field>, CatalogError> {
        self.store.read(|tx| {
            require_dataset_version(tx, id)?;
            tx.fields(id)
        })
    }

    /// Returns the dataset facets snapshotted by the latest edge to a version.
    ///
    /// `None` when no run references the version yet.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the version does not exist.
    pub fn latest_dataset_facets(
        &self,
        id: DatasetVersionId,
    ) -> Result<Option<FacetDocument>, CatalogError> {
        self.store.read(|tx| {
            require_dataset_version(tx, id)?;
            Ok(tx.latest_edge_for_dataset_version(id)?.map(|edge| edge.dataset_facets))
        })
    }

    /// Returns a run.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the run does not exist.
    pub fn get_run(&self, id: RunId) -> Result<Run, CatalogError> {
        self.store.read(|tx| require_run(tx, id))
    }

    /// Returns a run by its external id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when no run carries the id.
    pub fn get_run_by_external_id(&self, id: &ExternalRunId) -> Result<Run, CatalogError> {
        self.store.read(|tx| {
            tx.run_by_external_id(id)?.ok_or_else(|| CatalogError::not_found("run", id))
        })
    }

    /// Lists the events of a run in event-time order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the run does not exist.
    pub fn list_run_events(&self, id: RunId) -> Result<Vec<RunEventRecord>, CatalogError> {
        self.store.read(|tx| {
            require_run(tx, id)?;
            tx.run_events(id)
        })
    }

    /// Lists the edges of a run joined with dataset version and namespace.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the run does not exist.
    pub fn list_run_edges(&self, id: RunId) -> Result<Vec<EdgeWithDataset>, CatalogError> {
        self.store.read(|tx| {
            require_run(tx, id)?;
            let edges = tx.edges_for_run(id)?;
            edges
                .into_iter()
                .map(|edge| -> Result<EdgeWithDataset, CatalogError> {
                    let dataset_version = require_dataset_version(tx, edge.dataset_version_id)?;
                    let namespace = require_dataset_namespace(tx, dataset_version.namespace_id)?;
                    Ok(EdgeWithDataset {
                        edge,
                        dataset_version,
                        namespace,
                    })
                })
                .collect()
        })
    }

    /// Lists every raw audit request.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the store fails.
    pub fn list_audit_requests(&self) -> Result<Vec<AuditRequest>, CatalogError> {
        self.store.read(|tx| tx.audit_requests())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads a job namespace or fails with not found.
fn require_job_namespace(
    tx: &mut dyn CatalogTx,
    id: JobNamespaceId,
) -> Result<JobNamespace, CatalogError> {
    tx.job_namespace(id)?.ok_or_else(|| CatalogError::not_found("job namespace", id))
}

/// Loads a dataset namespace or fails with not found.
fn require_dataset_namespace(
    tx: &mut dyn CatalogTx,
    id: DatasetNamespaceId,
) -> Result<DatasetNamespace, CatalogError> {
    tx.dataset_namespace(id)?.ok_or_else(|| CatalogError::not_found("dataset namespace", id))
}

/// Loads a dataset version or fails with not found.
fn require_dataset_version(
    tx: &mut dyn CatalogTx,
    id: DatasetVersionId,
) -> Result<DatasetVersion, CatalogError> {
    tx.dataset_version(id)?.ok_or_else(|| CatalogError::not_found("dataset version", id))
}

/// Loads a run or fails with not found.
fn require_run(tx: &mut dyn CatalogTx, id: RunId) -> Result<Run, CatalogError> {
    tx.run(id)?.ok_or_else(|| CatalogError::not_found("run", id))
}
