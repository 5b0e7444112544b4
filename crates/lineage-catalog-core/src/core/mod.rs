// crates/lineage-catalog-core/src/core/mod.rs
// ============================================================================
// Module: Lineage Catalog Core Types
// Description: Canonical identifiers, facets, events, and catalog records.
// Purpose: Provide stable, serializable types shared by the engine and stores.
// Dependencies: serde, serde_json, time, uuid
// ============================================================================

//! ## Overview
//! Core types describe what arrives (run events and their facets) and what
//! is kept (namespaces, jobs, datasets, versions, runs, edges, audit rows).
//! They carry no storage or orchestration logic.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod event;
pub mod facets;
pub mod identifiers;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::AuditRequest;
pub use catalog::Dataset;
pub use catalog::DatasetNamespace;
pub use catalog::DatasetVersion;
pub use catalog::DatasetWithNamespace;
pub use catalog::EdgeWithDataset;
pub use catalog::Field;
pub use catalog::Job;
pub use catalog::JobNamespace;
pub use catalog::JobVersion;
pub use catalog::JobWithNamespace;
pub use catalog::Namespace;
pub use catalog::NewDataset;
pub use catalog::NewDatasetVersion;
pub use catalog::NewEdge;
pub use catalog::NewField;
pub use catalog::NewJob;
pub use catalog::NewJobVersion;
pub use catalog::NewRun;
pub use catalog::NewRunEvent;
pub use catalog::Run;
pub use catalog::RunDatasetEdge;
pub use catalog::RunEventRecord;
pub use catalog::RunPhase;
pub use catalog::RunUpdate;
pub use event::DatasetRef;
pub use event::EventType;
pub use event::IoType;
pub use event::JobRef;
pub use event::LineageEvent;
pub use event::RunRef;
pub use facets::DatasetFacets;
pub use facets::FacetDocument;
pub use facets::InputDatasetFacets;
pub use facets::JobFacets;
pub use facets::OutputDatasetFacets;
pub use facets::RunFacets;
pub use identifiers::AuditRequestId;
pub use identifiers::DatasetId;
pub use identifiers::DatasetNamespaceId;
pub use identifiers::DatasetVersionId;
pub use identifiers::ExternalRunId;
pub use identifiers::FieldId;
pub use identifiers::JobId;
pub use identifiers::JobNamespaceId;
pub use identifiers::JobVersionId;
pub use identifiers::RunEventId;
pub use identifiers::RunId;
pub use time::Clock;
pub use time::FixedClock;
pub use time::SystemClock;
pub use time::Timestamp;
