// crates/lineage-catalog-core/src/runtime/store.rs
// ============================================================================
// Module: Lineage Catalog In-Memory Store
// Description: Copy-on-write in-memory catalog store for tests and demos.
// Purpose: Provide a transactional store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`CatalogStore`].
//! A transaction works on a private copy of every table and swaps it in
//! only when the work succeeds, so failed events leave no trace. Writers
//! are serialized by a mutex. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

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
use crate::core::FieldId;
use crate::core::Job;
use crate::core::JobId;
use crate::core::JobNamespace;
use crate::core::JobNamespaceId;
use crate::core::JobVersion;
use crate::core::JobVersionId;
use crate::core::Namespace;
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
use crate::core::RunEventId;
use crate::core::RunEventRecord;
use crate::core::RunId;
use crate::core::RunUpdate;
use crate::core::Timestamp;
use crate::interfaces::CatalogError;
use crate::interfaces::CatalogStore;
use crate::interfaces::CatalogTx;

// ============================================================================
// SECTION: Tables
// ============================================================================

/// Every catalog table, indexed by `id - 1`.
#[derive(Debug, Clone, Default)]
struct CatalogTables {
    /// Raw audit requests.
    audit_requests: Vec<AuditRequest>,
    /// Job namespace pool.
    job_namespaces: Vec<JobNamespace>,
    /// Dataset namespace pool.
    dataset_namespaces: Vec<DatasetNamespace>,
    /// Jobs.
    jobs: Vec<Job>,
    /// Job versions.
    job_versions: Vec<JobVersion>,
    /// Datasets.
    datasets: Vec<Dataset>,
    /// Dataset versions.
    dataset_versions: Vec<DatasetVersion>,
    /// Fields.
    fields: Vec<Field>,
    /// Runs.
    runs: Vec<Run>,
    /// Run events.
    run_events: Vec<RunEventRecord>,
    /// Run/dataset-version edges in creation order.
    edges: Vec<RunDatasetEdge>,
}

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory catalog store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogStore {
    /// Committed tables protected by a mutex.
    tables: Arc<Mutex<CatalogTables>>,
}

impl InMemoryCatalogStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn transact<T, F>(&self, work: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut dyn CatalogTx) -> Result<T, CatalogError>,
    {
        let mut guard = self.tables.lock().map_err(|_| poisoned())?;
        let mut working = guard.clone();
        let result = work(&mut InMemoryTx {
            tables: &mut working,
        });
        if result.is_ok() {
            *guard = working;
        }
        drop(guard);
        result
    }

    fn read<T, F>(&self, work: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut dyn CatalogTx) -> Result<T, CatalogError>,
    {
        let mut snapshot = self.tables.lock().map_err(|_| poisoned())?.clone();
        work(&mut InMemoryTx {
            tables: &mut snapshot,
        })
    }
}

/// Transaction scope over a private table copy.
struct InMemoryTx<'a> {
    /// Tables visible to this transaction.
    tables: &'a mut CatalogTables,
}

impl CatalogTx for InMemoryTx<'_> {
    fn insert_audit_request(
        &mut self,
        payload: &[u8],
        created_at: Timestamp,
    ) -> Result<AuditRequestId, CatalogError> {
        let rows = &mut self.tables.audit_requests;
        let id = next_id(rows.len(), AuditRequestId::from_raw)?;
        rows.push(AuditRequest {
            id,
            payload: payload.to_vec(),
            created_at,
        });
        Ok(id)
    }

    fn audit_requests(&mut self) -> Result<Vec<AuditRequest>, CatalogError> {
        Ok(self.tables.audit_requests.clone())
    }

    fn job_namespace_by_name(&mut self, name: &str) -> Result<Option<JobNamespace>, CatalogError> {
        Ok(self.tables.job_namespaces.iter().find(|row| row.name == name).cloned())
    }

    fn job_namespace(&mut self, id: JobNamespaceId) -> Result<Option<JobNamespace>, CatalogError> {
        Ok(row(&self.tables.job_namespaces, id.get()).cloned())
    }

    fn insert_job_namespace(
        &mut self,
        name: &str,
        created_at: Timestamp,
    ) -> Result<Option<JobNamespace>, CatalogError> {
        let rows = &mut self.tables.job_namespaces;
        if rows.iter().any(|row| row.name == name) {
            return Ok(None);
        }
        let namespace = Namespace {
            id: next_id(rows.len(), JobNamespaceId::from_raw)?,
            name: name.to_string(),
            created_at,
            updated_at: None,
        };
        rows.push(namespace.clone());
        Ok(Some(namespace))
    }

    fn dataset_namespace_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<DatasetNamespace>, CatalogError> {
        Ok(self.tables.dataset_namespaces.iter().find(|row| row.name == name).cloned())
    }

    fn dataset_namespace(
        &mut self,
        id: DatasetNamespaceId,
    ) -> Result<Option<DatasetNamespace>, CatalogError> {
        Ok(row(&self.tables.dataset_namespaces, id.get()).cloned())
    }

    fn insert_dataset_namespace(
        &mut self,
        name: &str,
        created_at: Timestamp,
    ) -> Result<Option<DatasetNamespace>, CatalogError> {
        let rows = &mut self.tables.dataset_namespaces;
        if rows.iter().any(|row| row.name == name) {
            return Ok(None);
        }
        let namespace = Namespace {
            id: next_id(rows.len(), DatasetNamespaceId::from_raw)?,
            name: name.to_string(),
            created_at,
            updated_at: None,
        };
        rows.push(namespace.clone());
        Ok(Some(namespace))
    }

    fn job_by_name(
        &mut self,
        namespace_id: JobNamespaceId,
        name: &str,
    ) -> Result<Option<Job>, CatalogError> {
        Ok(self
            .tables
            .jobs
            .iter()
            .find(|row| row.namespace_id == namespace_id && row.name == name)
            .cloned())
    }

    fn job(&mut self, id: JobId) -> Result<Option<Job>, CatalogError> {
        Ok(row(&self.tables.jobs, id.get()).cloned())
    }

    fn jobs(&mut self) -> Result<Vec<Job>, CatalogError> {
        Ok(self.tables.jobs.clone())
    }

    fn insert_job(&mut self, job: &NewJob<'_>) -> Result<Option<Job>, CatalogError> {
        let rows = &mut self.tables.jobs;
        if rows.iter().any(|row| row.namespace_id == job.namespace_id && row.name == job.name) {
            return Ok(None);
        }
        let stored = Job {
            id: next_id(rows.len(), JobId::from_raw)?,
            namespace_id: job.namespace_id,
            name: job.name.to_string(),
            current_version_id: None,
            facets: job.facets.clone(),
            created_at: job.created_at,
            updated_at: None,
        };
        rows.push(stored.clone());
        Ok(Some(stored))
    }

    fn update_job_facets(
        &mut self,
        id: JobId,
        facets: &FacetDocument,
        updated_at: Timestamp,
    ) -> Result<Job, CatalogError> {
        let job =
            row_mut(&mut self.tables.jobs, id.get()).ok_or_else(|| CatalogError::not_found("job", id))?;
        job.facets = facets.clone();
        job.updated_at = Some(updated_at);
        Ok(job.clone())
    }

    fn set_current_job_version(
        &mut self,
        id: JobId,
        version_id: JobVersionId,
        updated_at: Timestamp,
    ) -> Result<Job, CatalogError> {
        let job =
            row_mut(&mut self.tables.jobs, id.get()).ok_or_else(|| CatalogError::not_found("job", id))?;
        job.current_version_id = Some(version_id);
        job.updated_at = Some(updated_at);
        Ok(job.clone())
    }

    fn job_version(&mut self, id: JobVersionId) -> Result<Option<JobVersion>, CatalogError> {
        Ok(row(&self.tables.job_versions, id.get()).cloned())
    }

    fn job_versions(&mut self, job_id: JobId) -> Result<Vec<JobVersion>, CatalogError> {
        Ok(self.tables.job_versions.iter().filter(|row| row.job_id == job_id).cloned().collect())
    }

    fn insert_job_version(
        &mut self,
        version: &NewJobVersion<'_>,
    ) -> Result<JobVersion, CatalogError> {
        let rows = &mut self.tables.job_versions;
        let stored = JobVersion {
            id: next_id(rows.len(), JobVersionId::from_raw)?,
            job_id: version.job_id,
            namespace_id: version.namespace_id,
            name: version.name.to_string(),
            facets: version.facets.clone(),
            created_at: version.created_at,
            updated_at: None,
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    fn dataset_by_name(
        &mut self,
        namespace_id: DatasetNamespaceId,
        name: &str,
    ) -> Result<Option<Dataset>, CatalogError> {
        Ok(self
            .tables
            .datasets
            .iter()
            .find(|row| row.namespace_id == namespace_id && row.name == name)
            .cloned())
    }

    fn dataset(&mut self, id: DatasetId) -> Result<Option<Dataset>, CatalogError> {
        Ok(row(&self.tables.datasets, id.get()).cloned())
    }

    fn datasets(&mut self) -> Result<Vec<Dataset>, CatalogError> {
        Ok(self.tables.datasets.clone())
    }

    fn insert_dataset(&mut self, dataset: &NewDataset<'_>) -> Result<Option<Dataset>, CatalogError> {
        let rows = &mut self.tables.datasets;
        if rows
            .iter()
            .any(|row| row.namespace_id == dataset.namespace_id && row.name == dataset.name)
        {
            return Ok(None);
        }
        let stored = Dataset {
            id: next_id(rows.len(), DatasetId::from_raw)?,
            namespace_id: dataset.namespace_id,
            name: dataset.name.to_string(),
            current_version_id: None,
            facets: dataset.facets.clone(),
            created_at: dataset.created_at,
            updated_at: None,
        };
        rows.push(stored.clone());
        Ok(Some(stored))
    }

    fn update_dataset_facets(
        &mut self,
        id: DatasetId,
        facets: &FacetDocument,
        updated_at: Timestamp,
    ) -> Result<Dataset, CatalogError> {
        let dataset = row_mut(&mut self.tables.datasets, id.get())
            .ok_or_else(|| CatalogError::not_found("dataset", id))?;
        dataset.facets = facets.clone();
        dataset.updated_at = Some(updated_at);
        Ok(dataset.clone())
    }

    fn set_current_dataset_version(
        &mut self,
        id: DatasetId,
        version_id: DatasetVersionId,
        updated_at: Timestamp,
    ) -> Result<Dataset, CatalogError> {
        let dataset = row_mut(&mut self.tables.datasets, id.get())
            .ok_or_else(|| CatalogError::not_found("dataset", id))?;
        dataset.current_version_id = Some(version_id);
        dataset.updated_at = Some(updated_at);
        Ok(dataset.clone())
    }

    fn dataset_version(
        &mut self,
        id: DatasetVersionId,
    ) -> Result<Option<DatasetVersion>, CatalogError> {
        Ok(row(&self.tables.dataset_versions, id.get()).cloned())
    }

    fn dataset_versions(
        &mut self,
        dataset_id: DatasetId,
    ) -> Result<Vec<DatasetVersion>, CatalogError> {
        Ok(self
            .tables
            .dataset_versions
            .iter()
            .filter(|row| row.dataset_id == dataset_id)
            .cloned()
            .collect())
    }

    fn insert_dataset_version(
        &mut self,
        version: &NewDatasetVersion<'_>,
    ) -> Result<DatasetVersion, CatalogError> {
        let rows = &mut self.tables.dataset_versions;
        let stored = DatasetVersion {
            id: next_id(rows.len(), DatasetVersionId::from_raw)?,
            dataset_id: version.dataset_id,
            namespace_id: version.namespace_id,
            name: version.name.to_string(),
            created_at: version.created_at,
            updated_at: None,
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    fn fields(&mut self, version_id: DatasetVersionId) -> Result<Vec<Field>, CatalogError> {
        Ok(self
            .tables
            .fields
            .iter()
            .filter(|row| row.dataset_version_id == version_id)
            .cloned()
            .collect())
    }

    fn insert_field(&mut self, field: &NewField<'_>) -> Result<Field, CatalogError> {
        let rows = &mut self.tables.fields;
        let stored = Field {
            id: next_id(rows.len(), FieldId::from_raw)?,
            dataset_version_id: field.dataset_version_id,
            name: field.name.to_string(),
            data_type: field.data_type.to_string(),
            description: field.description.map(str::to_string),
            created_at: field.created_at,
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    fn run_by_external_id(&mut self, id: &ExternalRunId) -> Result<Option<Run>, CatalogError> {
        Ok(self.tables.runs.iter().find(|row| row.external_id == *id).cloned())
    }

    fn run(&mut self, id: RunId) -> Result<Option<Run>, CatalogError> {
        Ok(row(&self.tables.runs, id.get()).cloned())
    }

    fn runs_for_job_version(&mut self, id: JobVersionId) -> Result<Vec<Run>, CatalogError> {
        Ok(self.tables.runs.iter().filter(|row| row.job_version_id == id).cloned().collect())
    }

    fn insert_run(&mut self, run: &NewRun<'_>) -> Result<Option<Run>, CatalogError> {
        let rows = &mut self.tables.runs;
        if rows.iter().any(|row| row.external_id == run.external_id) {
            return Ok(None);
        }
        let stored = Run {
            id: next_id(rows.len(), RunId::from_raw)?,
            external_id: run.external_id,
            job_version_id: run.job_version_id,
            parent_run_id: run.parent_run_id,
            facets: run.facets.clone(),
            last_event_type: None,
            nominal_started_at: run.nominal_started_at,
            nominal_ended_at: run.nominal_ended_at,
            started_at: run.started_at,
            ended_at: None,
            error_message: None,
            programming_language: None,
            stacktrace: None,
            created_at: run.created_at,
            updated_at: None,
        };
        rows.push(stored.clone());
        Ok(Some(stored))
    }

    fn update_run(&mut self, update: &RunUpdate<'_>) -> Result<Run, CatalogError> {
        let run = row_mut(&mut self.tables.runs, update.id.get())
            .ok_or_else(|| CatalogError::not_found("run", update.id))?;
        run.facets = update.facets.clone();
        run.ended_at = update.ended_at;
        run.last_event_type = Some(update.last_event_type);
        run.error_message = update.error_message.map(str::to_string);
        run.programming_language = update.programming_language.map(str::to_string);
        run.stacktrace = update.stacktrace.map(str::to_string);
        run.updated_at = Some(update.updated_at);
        Ok(run.clone())
    }

    fn insert_run_event(
        &mut self,
        event: &NewRunEvent<'_>,
    ) -> Result<RunEventRecord, CatalogError> {
        let rows = &mut self.tables.run_events;
        let stored = RunEventRecord {
            id: next_id(rows.len(), RunEventId::from_raw)?,
            run_id: event.run_id,
            event_type: event.event_type,
            event_time: event.event_time,
            facets: event.facets.clone(),
            created_at: event.created_at,
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    fn run_events(&mut self, run_id: RunId) -> Result<Vec<RunEventRecord>, CatalogError> {
        let mut events: Vec<RunEventRecord> =
            self.tables.run_events.iter().filter(|row| row.run_id == run_id).cloned().collect();
        events.sort_by_key(|row| (row.event_time, row.id));
        Ok(events)
    }

    fn edge(
        &mut self,
        run_id: RunId,
        version_id: DatasetVersionId,
    ) -> Result<Option<RunDatasetEdge>, CatalogError> {
        Ok(self
            .tables
            .edges
            .iter()
            .find(|row| row.run_id == run_id && row.dataset_version_id == version_id)
            .cloned())
    }

    fn insert_edge(&mut self, edge: &NewEdge<'_>) -> Result<Option<RunDatasetEdge>, CatalogError> {
        let rows = &mut self.tables.edges;
        if rows
            .iter()
            .any(|row| row.run_id == edge.run_id && row.dataset_version_id == edge.dataset_version_id)
        {
            return Ok(None);
        }
        let stored = RunDatasetEdge {
            run_id: edge.run_id,
            dataset_version_id: edge.dataset_version_id,
            io_type: edge.io_type,
            io_facets: edge.io_facets.clone(),
            dataset_facets: edge.dataset_facets.clone(),
            created_at: edge.created_at,
        };
        rows.push(stored.clone());
        Ok(Some(stored))
    }

    fn edges_for_run(&mut self, run_id: RunId) -> Result<Vec<RunDatasetEdge>, CatalogError> {
        Ok(self.tables.edges.iter().filter(|row| row.run_id == run_id).cloned().collect())
    }

    fn latest_edge_for_dataset_version(
        &mut self,
        version_id: DatasetVersionId,
    ) -> Result<Option<RunDatasetEdge>, CatalogError> {
        Ok(self
            .tables
            .edges
            .iter()
            .rev()
            .find(|row| row.dataset_version_id == version_id)
            .cloned())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the error raised when the table mutex is poisoned.
fn poisoned() -> CatalogError {
    CatalogError::persistence("lock", "in-memory catalog mutex poisoned")
}

/// Allocates the id for a row appended to a table of `len` rows.
fn next_id<I>(len: usize, ctor: fn(u64) -> Option<I>) -> Result<I, CatalogError> {
    u64::try_from(len)
        .ok()
        .and_then(|len| len.checked_add(1))
        .and_then(ctor)
        .ok_or_else(|| CatalogError::persistence("insert", "identifier space exhausted"))
}

/// Returns the row with surrogate id `raw`.
fn row<T>(rows: &[T], raw: u64) -> Option<&T> {
    usize::try_from(raw).ok()?.checked_sub(1).and_then(|index| rows.get(index))
}

/// Returns the mutable row with surrogate id `raw`.
fn row_mut<T>(rows: &mut [T], raw: u64) -> Option<&mut T> {
    usize::try_from(raw).ok()?.checked_sub(1).and_then(|index| rows.get_mut(index))
}
