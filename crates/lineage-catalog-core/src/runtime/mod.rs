// crates/lineage-catalog-core/src/runtime/mod.rs
// ============================================================================
// Module: Lineage Catalog Runtime
// Description: Ingestion pipeline, entity resolution, and read queries.
// Purpose: Turn lineage events into catalog state inside one transaction.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the ingestion pipeline and the read-side query
//! surface. Every component receives the same transactional scope so one
//! event either lands completely or not at all.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod edges;
pub mod entities;
pub mod ingest;
pub mod namespaces;
pub mod queries;
pub mod runs;
pub mod store;
pub mod versions;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileIngestLogSink;
pub use audit::IngestLogEvent;
pub use audit::IngestLogSink;
pub use audit::IngestOutcome;
pub use audit::MemoryIngestLogSink;
pub use audit::NoopIngestLogSink;
pub use audit::StderrIngestLogSink;
pub use edges::RecordedEdge;
pub use entities::Upserted;
pub use ingest::CancelToken;
pub use ingest::DEFAULT_MAX_DATASETS_PER_EVENT;
pub use ingest::DEFAULT_MAX_PAYLOAD_BYTES;
pub use ingest::IngestConfig;
pub use ingest::IngestReceipt;
pub use ingest::LineageIngestor;
pub use namespaces::NamespacePool;
pub use queries::CatalogQueries;
pub use store::InMemoryCatalogStore;
pub use versions::DatasetVersionOutcome;
