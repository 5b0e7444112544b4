// crates/lineage-catalog-core/src/lib.rs
// ============================================================================
// Module: Lineage Catalog Core Library
// Description: Public API surface for the lineage catalog core.
// Purpose: Expose core types, store interfaces, and the ingestion runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Lineage catalog core ingests run lifecycle events, maintains a versioned
//! catalog of jobs, datasets, and runs, and records which dataset versions a
//! completed run read and wrote. It is backend-agnostic and reaches storage
//! only through the [`CatalogStore`] and [`CatalogTx`] interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::CatalogError;
pub use interfaces::CatalogStore;
pub use interfaces::CatalogTx;
pub use runtime::CancelToken;
pub use runtime::DEFAULT_MAX_DATASETS_PER_EVENT;
pub use runtime::DEFAULT_MAX_PAYLOAD_BYTES;
pub use runtime::CatalogQueries;
pub use runtime::FileIngestLogSink;
pub use runtime::InMemoryCatalogStore;
pub use runtime::IngestConfig;
pub use runtime::IngestLogEvent;
pub use runtime::IngestLogSink;
pub use runtime::IngestOutcome;
pub use runtime::IngestReceipt;
pub use runtime::LineageIngestor;
pub use runtime::MemoryIngestLogSink;
pub use runtime::NoopIngestLogSink;
pub use runtime::StderrIngestLogSink;
