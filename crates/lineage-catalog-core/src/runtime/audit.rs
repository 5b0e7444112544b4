// crates/lineage-catalog-core/src/runtime/audit.rs
// ============================================================================
// Module: Ingest Audit Logging
// Description: Structured ingest log events and JSON-line sinks.
// Purpose: Emit one machine-readable record per ingest attempt.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every call into the ingestor produces exactly one [`IngestLogEvent`],
//! whether the unit of work committed or was discarded. Sinks serialize the
//! event as a single JSON line. Deployments pick stderr, an append-only file,
//! or nothing; the in-memory sink exists for tests and embedding hosts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::core::EventType;
use crate::core::LineageEvent;
use crate::core::RunEventId;
use crate::core::RunId;
use crate::core::Timestamp;
use crate::interfaces::CatalogError;
use crate::runtime::ingest::IngestReceipt;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Final state of an ingest attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    /// The unit of work committed.
    Committed,
    /// The payload was refused before a transaction started.
    Rejected,
    /// The transaction started and was rolled back.
    RolledBack,
}

/// Ingest log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestLogEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: i64,
    /// Final state.
    pub outcome: IngestOutcome,
    /// Error label when the attempt failed.
    pub error_kind: Option<&'static str>,
    /// Error message when the attempt failed.
    pub error: Option<String>,
    /// Inbound event type, when the payload decoded.
    pub event_type: Option<EventType>,
    /// External run id, when the payload decoded.
    pub external_run_id: Option<String>,
    /// Job namespace, when the payload decoded.
    pub job_namespace: Option<String>,
    /// Job name, when the payload decoded.
    pub job_name: Option<String>,
    /// Internal run id on success.
    pub run_id: Option<RunId>,
    /// Appended run event id on success.
    pub run_event_id: Option<RunEventId>,
    /// True when the run was created by this event.
    pub run_created: bool,
    /// Dataset versions minted by this event.
    pub dataset_versions_created: usize,
    /// Edges inserted by this event.
    pub edges_created: usize,
    /// Raw payload size in bytes.
    pub payload_bytes: usize,
}

impl IngestLogEvent {
    /// Event identifier emitted by the ingestor.
    pub const EVENT: &'static str = "lineage_ingest";

    /// Builds the record for a committed event.
    #[must_use]
    pub fn committed(
        at: Timestamp,
        event: &LineageEvent,
        receipt: &IngestReceipt,
        payload_bytes: usize,
    ) -> Self {
        Self {
            run_id: Some(receipt.run_id),
            run_event_id: Some(receipt.run_event_id),
            run_created: receipt.run_created,
            dataset_versions_created: receipt.dataset_versions_created,
            edges_created: receipt.edges_created,
            ..Self::base(at, IngestOutcome::Committed, Some(event), payload_bytes)
        }
    }

    /// Builds the record for a failed attempt.
    #[must_use]
    pub fn failed(
        at: Timestamp,
        outcome: IngestOutcome,
        event: Option<&LineageEvent>,
        error: &CatalogError,
        payload_bytes: usize,
    ) -> Self {
        Self {
            error_kind: Some(error.kind()),
            error: Some(error.to_string()),
            ..Self::base(at, outcome, event, payload_bytes)
        }
    }

    /// Builds the fields shared by every record.
    fn base(
        at: Timestamp,
        outcome: IngestOutcome,
        event: Option<&LineageEvent>,
        payload_bytes: usize,
    ) -> Self {
        Self {
            event: Self::EVENT,
            timestamp_ms: at.unix_millis(),
            outcome,
            error_kind: None,
            error: None,
            event_type: event.map(|event| event.event_type),
            external_run_id: event.map(|event| event.run.run_id.to_string()),
            job_namespace: event.map(|event| event.job.namespace.clone()),
            job_name: event.map(|event| event.job.name.clone()),
            run_id: None,
            run_event_id: None,
            run_created: false,
            dataset_versions_created: 0,
            edges_created: 0,
            payload_bytes,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for ingest log records.
pub trait IngestLogSink: Send + Sync {
    /// Record an ingest log event.
    fn record(&self, event: &IngestLogEvent);
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink that logs JSON lines to stderr.
pub struct StderrIngestLogSink;

impl IngestLogSink for StderrIngestLogSink {
    fn record(&self, event: &IngestLogEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that logs JSON lines to a file.
pub struct FileIngestLogSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileIngestLogSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl IngestLogSink for FileIngestLogSink {
    fn record(&self, event: &IngestLogEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that keeps records in memory.
#[derive(Default)]
pub struct MemoryIngestLogSink {
    /// Recorded events.
    events: Mutex<Vec<IngestLogEvent>>,
}

impl MemoryIngestLogSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded event.
    #[must_use]
    pub fn events(&self) -> Vec<IngestLogEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl IngestLogSink for MemoryIngestLogSink {
    fn record(&self, event: &IngestLogEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// No-op sink.
pub struct NoopIngestLogSink;

impl IngestLogSink for NoopIngestLogSink {
    fn record(&self, _event: &IngestLogEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
