// crates/lineage-catalog-core/src/core/catalog.rs
// ============================================================================
// Module: Lineage Catalog Records
// Description: Persisted catalog entities, insert parameters, and projections.
// Purpose: Share one record model between the ingestion engine and every store.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! One record type per catalog table plus the joined projections returned by
//! read queries. `New*` structs carry the values a store needs to insert a
//! row; the store assigns the surrogate id. Records hold facets as decoded
//! [`FacetDocument`]s so readers never see half-decoded rows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::event::EventType;
use crate::core::event::IoType;
use crate::core::facets::DatasetFacets;
use crate::core::facets::FacetDocument;
use crate::core::facets::InputDatasetFacets;
use crate::core::facets::JobFacets;
use crate::core::facets::OutputDatasetFacets;
use crate::core::facets::RunFacets;
use crate::core::identifiers::AuditRequestId;
use crate::core::identifiers::DatasetId;
use crate::core::identifiers::DatasetNamespaceId;
use crate::core::identifiers::DatasetVersionId;
use crate::core::identifiers::ExternalRunId;
use crate::core::identifiers::FieldId;
use crate::core::identifiers::JobId;
use crate::core::identifiers::JobNamespaceId;
use crate::core::identifiers::JobVersionId;
use crate::core::identifiers::RunEventId;
use crate::core::identifiers::RunId;
use crate::core::time::Timestamp;
use crate::interfaces::CatalogError;

// ============================================================================
// SECTION: Namespaces
// ============================================================================

/// Named partition for jobs or datasets.
///
/// # Invariants
/// - `name` is unique within its pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Namespace<I> {
    /// Surrogate id.
    pub id: I,
    /// Namespace name.
    pub name: String,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Option<Timestamp>,
}

/// Namespace from the job pool.
pub type JobNamespace = Namespace<JobNamespaceId>;
/// Namespace from the dataset pool.
pub type DatasetNamespace = Namespace<DatasetNamespaceId>;

// ============================================================================
// SECTION: Jobs
// ============================================================================

/// Job entity.
///
/// # Invariants
/// - `(namespace_id, name)` is unique.
/// - `current_version_id` is set once and then never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    /// Surrogate id.
    pub id: JobId,
    /// Owning namespace.
    pub namespace_id: JobNamespaceId,
    /// Job name.
    pub name: String,
    /// Current version, unset until first versioned.
    pub current_version_id: Option<JobVersionId>,
    /// Latest job facets.
    pub facets: FacetDocument,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Option<Timestamp>,
}

impl Job {
    /// Decodes the typed job facet view.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`] for malformed facets.
    pub fn facets_view(&self) -> Result<JobFacets, CatalogError> {
        self.facets.view()
    }
}

/// Insert parameters for a job.
#[derive(Debug, Clone)]
pub struct NewJob<'a> {
    /// Owning namespace.
    pub namespace_id: JobNamespaceId,
    /// Job name.
    pub name: &'a str,
    /// Initial facets.
    pub facets: &'a FacetDocument,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Immutable snapshot of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobVersion {
    /// Surrogate id.
    pub id: JobVersionId,
    /// Versioned job.
    pub job_id: JobId,
    /// Namespace of the job at snapshot time.
    pub namespace_id: JobNamespaceId,
    /// Job name at snapshot time.
    pub name: String,
    /// Job facets at snapshot time.
    pub facets: FacetDocument,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Option<Timestamp>,
}

/// Insert parameters for a job version.
#[derive(Debug, Clone)]
pub struct NewJobVersion<'a> {
    /// Versioned job.
    pub job_id: JobId,
    /// Namespace of the job.
    pub namespace_id: JobNamespaceId,
    /// Job name.
    pub name: &'a str,
    /// Snapshot facets.
    pub facets: &'a FacetDocument,
    /// Creation time.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Datasets
// ============================================================================

/// Dataset entity.
///
/// # Invariants
/// - `(namespace_id, name)` is unique.
/// - `current_version_id` references the most recently created version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    /// Surrogate id.
    pub id: DatasetId,
    /// Owning namespace.
    pub namespace_id: DatasetNamespaceId,
    /// Dataset name.
    pub name: String,
    /// Current version, unset until first versioned.
    pub current_version_id: Option<DatasetVersionId>,
    /// Latest dataset facets.
    pub facets: FacetDocument,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Option<Timestamp>,
}

impl Dataset {
    /// Decodes the typed dataset facet view.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`] for malformed facets.
    pub fn facets_view(&self) -> Result<DatasetFacets, CatalogError> {
        self.facets.view()
    }
}

/// Insert parameters for a dataset.
#[derive(Debug, Clone)]
pub struct NewDataset<'a> {
    /// Owning namespace.
    pub namespace_id: DatasetNamespaceId,
    /// Dataset name.
    pub name: &'a str,
    /// Initial facets.
    pub facets: &'a FacetDocument,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Immutable dataset version owning a fixed field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetVersion {
    /// Surrogate id.
    pub id: DatasetVersionId,
    /// Versioned dataset.
    pub dataset_id: DatasetId,
    /// Namespace of the dataset.
    pub namespace_id: DatasetNamespaceId,
    /// Dataset name.
    pub name: String,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Option<Timestamp>,
}

/// Insert parameters for a dataset version.
#[derive(Debug, Clone)]
pub struct NewDatasetVersion<'a> {
    /// Versioned dataset.
    pub dataset_id: DatasetId,
    /// Namespace of the dataset.
    pub namespace_id: DatasetNamespaceId,
    /// Dataset name.
    pub name: &'a str,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Schema field of a dataset version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Surrogate id.
    pub id: FieldId,
    /// Owning dataset version.
    pub dataset_version_id: DatasetVersionId,
    /// Field name.
    pub name: String,
    /// Declared data type.
    pub data_type: String,
    /// Field description.
    pub description: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Insert parameters for a field.
#[derive(Debug, Clone)]
pub struct NewField<'a> {
    /// Owning dataset version.
    pub dataset_version_id: DatasetVersionId,
    /// Field name.
    pub name: &'a str,
    /// Declared data type.
    pub data_type: &'a str,
    /// Field description.
    pub description: Option<&'a str>,
    /// Creation time.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Runs
// ============================================================================

/// Lifecycle phase of an existing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// No complete event applied yet.
    Open,
    /// A complete event has been applied.
    Closed,
}

/// One execution of a job version.
///
/// # Invariants
/// - `external_id` is unique.
/// - `parent_run_id` and the nominal window are fixed at creation.
/// - `facets` is the shallow union of every event's run facets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    /// Surrogate id.
    pub id: RunId,
    /// Caller-supplied run id.
    pub external_id: ExternalRunId,
    /// Executed job version.
    pub job_version_id: JobVersionId,
    /// Parent run, when declared by the first event.
    pub parent_run_id: Option<RunId>,
    /// Cumulative run facets.
    pub facets: FacetDocument,
    /// Type of the most recent event.
    pub last_event_type: Option<EventType>,
    /// Scheduled start.
    pub nominal_started_at: Option<Timestamp>,
    /// Scheduled end.
    pub nominal_ended_at: Option<Timestamp>,
    /// Time of the first event.
    pub started_at: Timestamp,
    /// Time of the latest complete event.
    pub ended_at: Option<Timestamp>,
    /// Error message from the error facet.
    pub error_message: Option<String>,
    /// Programming language from the error facet.
    pub programming_language: Option<String>,
    /// Stack trace from the error facet.
    pub stacktrace: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Option<Timestamp>,
}

impl Run {
    /// Returns the lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        if self.ended_at.is_some() { RunPhase::Closed } else { RunPhase::Open }
    }

    /// Decodes the typed run facet view.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`] for malformed facets.
    pub fn facets_view(&self) -> Result<RunFacets, CatalogError> {
        self.facets.view()
    }
}

/// Insert parameters for a run.
#[derive(Debug, Clone)]
pub struct NewRun<'a> {
    /// Caller-supplied run id.
    pub external_id: ExternalRunId,
    /// Executed job version.
    pub job_version_id: JobVersionId,
    /// Resolved parent run.
    pub parent_run_id: Option<RunId>,
    /// Initial facets.
    pub facets: &'a FacetDocument,
    /// Scheduled start.
    pub nominal_started_at: Option<Timestamp>,
    /// Scheduled end.
    pub nominal_ended_at: Option<Timestamp>,
    /// Time of the creating event.
    pub started_at: Timestamp,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Projection update applied to a run after each event.
#[derive(Debug, Clone)]
pub struct RunUpdate<'a> {
    /// Run to update.
    pub id: RunId,
    /// Merged facets.
    pub facets: &'a FacetDocument,
    /// End time.
    pub ended_at: Option<Timestamp>,
    /// Latest event type.
    pub last_event_type: EventType,
    /// Error message.
    pub error_message: Option<&'a str>,
    /// Programming language.
    pub programming_language: Option<&'a str>,
    /// Stack trace.
    pub stacktrace: Option<&'a str>,
    /// Update time.
    pub updated_at: Timestamp,
}

/// Append-only record of one inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunEventRecord {
    /// Surrogate id.
    pub id: RunEventId,
    /// Run the event belongs to.
    pub run_id: RunId,
    /// Event type.
    pub event_type: EventType,
    /// Event time.
    pub event_time: Timestamp,
    /// Facets carried by this event only.
    pub facets: FacetDocument,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Insert parameters for a run event.
#[derive(Debug, Clone)]
pub struct NewRunEvent<'a> {
    /// Run the event belongs to.
    pub run_id: RunId,
    /// Event type.
    pub event_type: EventType,
    /// Event time.
    pub event_time: Timestamp,
    /// Event facets.
    pub facets: &'a FacetDocument,
    /// Creation time.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Edges
// ============================================================================

/// Fact that a run read or wrote a dataset version.
///
/// # Invariants
/// - At most one edge per `(run_id, dataset_version_id)`.
/// - Never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunDatasetEdge {
    /// Run side.
    pub run_id: RunId,
    /// Dataset version side.
    pub dataset_version_id: DatasetVersionId,
    /// Direction.
    pub io_type: IoType,
    /// Direction-specific facets.
    pub io_facets: FacetDocument,
    /// Dataset facets as of edge creation.
    pub dataset_facets: FacetDocument,
    /// Creation time.
    pub created_at: Timestamp,
}

impl RunDatasetEdge {
    /// Decodes the input facet view (empty for output edges).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`] for malformed facets.
    pub fn input_facets(&self) -> Result<InputDatasetFacets, CatalogError> {
        match self.io_type {
            IoType::Input => self.io_facets.view(),
            IoType::Output => Ok(InputDatasetFacets::default()),
        }
    }

    /// Decodes the output facet view (empty for input edges).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`] for malformed facets.
    pub fn output_facets(&self) -> Result<OutputDatasetFacets, CatalogError> {
        match self.io_type {
            IoType::Output => self.io_facets.view(),
            IoType::Input => Ok(OutputDatasetFacets::default()),
        }
    }
}

/// Insert parameters for an edge.
#[derive(Debug, Clone)]
pub struct NewEdge<'a> {
    /// Run side.
    pub run_id: RunId,
    /// Dataset version side.
    pub dataset_version_id: DatasetVersionId,
    /// Direction.
    pub io_type: IoType,
    /// Direction-specific facets.
    pub io_facets: &'a FacetDocument,
    /// Dataset facet snapshot.
    pub dataset_facets: &'a FacetDocument,
    /// Creation time.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Raw inbound payload kept for replay and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRequest {
    /// Surrogate id.
    pub id: AuditRequestId,
    /// Exact payload bytes.
    pub payload: Vec<u8>,
    /// Creation time.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Projections
// ============================================================================

/// Job joined with its namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobWithNamespace {
    /// Job row.
    pub job: Job,
    /// Owning namespace.
    pub namespace: JobNamespace,
}

/// Dataset joined with its namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetWithNamespace {
    /// Dataset row.
    pub dataset: Dataset,
    /// Owning namespace.
    pub namespace: DatasetNamespace,
}

/// Edge joined with its dataset version and namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeWithDataset {
    /// Edge row.
    pub edge: RunDatasetEdge,
    /// Referenced dataset version.
    pub dataset_version: DatasetVersion,
    /// Namespace of the dataset.
    pub namespace: DatasetNamespace,
}
