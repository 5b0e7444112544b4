// crates/lineage-catalog-core/src/runtime/ingest.rs
// ============================================================================
// Module: Transaction Coordinator
// Description: Single-transaction ingestion pipeline for run events.
// Purpose: Apply one inbound event as one atomic set of catalog mutations.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! [`LineageIngestor`] owns a store, an explicit [`IngestConfig`], a clock and
//! a log sink. Each call validates the payload, then runs the whole pipeline
//! inside one `CatalogStore::transact` scope:
//!
//! 1. append the raw payload as an audit request,
//! 2. resolve the job namespace, upsert the job and ensure its version,
//! 3. get or create the run and append the run event,
//! 4. apply the event to the run projection,
//! 5. on complete events, record every input then every output edge.
//!
//! Any error discards the transaction; nothing from a failed event is
//! visible afterwards. The ingestor never retries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::core::Clock;
use crate::core::EventType;
use crate::core::JobId;
use crate::core::JobVersionId;
use crate::core::LineageEvent;
use crate::core::NewRunEvent;
use crate::core::RunEventId;
use crate::core::RunId;
use crate::core::SystemClock;
use crate::core::Timestamp;
use crate::interfaces::CatalogError;
use crate::interfaces::CatalogStore;
use crate::interfaces::CatalogTx;
use crate::runtime::audit::IngestLogEvent;
use crate::runtime::audit::IngestLogSink;
use crate::runtime::audit::IngestOutcome;
use crate::runtime::audit::NoopIngestLogSink;
use crate::runtime::edges::record_dataset_io;
use crate::runtime::entities::upsert_job;
use crate::runtime::namespaces::resolve_job_namespace;
use crate::runtime::queries::CatalogQueries;
use crate::runtime::runs::apply_event;
use crate::runtime::runs::get_or_create_run;
use crate::runtime::versions::ensure_job_version;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum inbound payload size (bytes).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;
/// Default maximum number of dataset references per event.
pub const DEFAULT_MAX_DATASETS_PER_EVENT: usize = 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Ingestion limits.
///
/// # Invariants
/// - Both limits are greater than zero once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Maximum raw payload size in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// Maximum inputs plus outputs per event.
    #[serde(default = "default_max_datasets_per_event")]
    pub max_datasets_per_event: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_datasets_per_event: DEFAULT_MAX_DATASETS_PER_EVENT,
        }
    }
}

impl IngestConfig {
    /// Validates the limits.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] when a limit is zero.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.max_payload_bytes == 0 {
            return Err(CatalogError::Validation(
                "max_payload_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_datasets_per_event == 0 {
            return Err(CatalogError::Validation(
                "max_datasets_per_event must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns the default payload limit.
const fn default_max_payload_bytes() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}

/// Returns the default dataset reference limit.
const fn default_max_datasets_per_event() -> usize {
    DEFAULT_MAX_DATASETS_PER_EVENT
}

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Cooperative cancellation flag checked between pipeline steps.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    /// Shared cancellation state.
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with [`CatalogError::Cancelled`] once cancellation was requested.
    fn checkpoint(&self) -> Result<(), CatalogError> {
        if self.is_cancelled() { Err(CatalogError::Cancelled) } else { Ok(()) }
    }
}

// ============================================================================
// SECTION: Receipt
// ============================================================================

/// Summary of a committed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReceipt {
    /// Appended run event.
    pub run_event_id: RunEventId,
    /// Run the event was applied to.
    pub run_id: RunId,
    /// Job of the run.
    pub job_id: JobId,
    /// Job version of the run.
    pub job_version_id: JobVersionId,
    /// Event type.
    pub event_type: EventType,
    /// Event time.
    pub event_time: Timestamp,
    /// True when the run was created by this event.
    pub run_created: bool,
    /// Dataset versions minted by this event.
    pub dataset_versions_created: usize,
    /// Edges inserted by this event.
    pub edges_created: usize,
}

// ============================================================================
// SECTION: Ingestor
// ============================================================================

/// Transaction coordinator for lineage events.
pub struct LineageIngestor<S> {
    /// Catalog backend.
    store: S,
    /// Ingestion limits.
    config: IngestConfig,
    /// Source of bookkeeping timestamps.
    clock: Arc<dyn Clock>,
    /// Destination of ingest log records.
    log_sink: Arc<dyn IngestLogSink>,
}

impl<S: CatalogStore> LineageIngestor<S> {
    /// Creates an ingestor with the system clock and no log sink.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] when `config` is invalid.
    pub fn new(store: S, config: IngestConfig) -> Result<Self, CatalogError> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            clock: Arc::new(SystemClock),
            log_sink: Arc::new(NoopIngestLogSink),
        })
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the log sink.
    #[must_use]
    pub fn with_log_sink(mut self, log_sink: Arc<dyn IngestLogSink>) -> Self {
        self.log_sink = log_sink;
        self
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the ingestion limits.
    #[must_use]
    pub const fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Returns read-side queries over the same store.
    #[must_use]
    pub const fn queries(&self) -> CatalogQueries<'_, S> {
        CatalogQueries::new(&self.store)
    }

    /// Decodes and ingests a raw event payload.
    ///
    /// The exact payload bytes are kept as the audit record.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when validation or any pipeline step fails;
    /// no mutation from the event is retained in that case.
    pub fn ingest_payload(&self, payload: &[u8]) -> Result<IngestReceipt, CatalogError> {
        self.ingest_payload_with_cancel(payload, &CancelToken::new())
    }

    /// Decodes and ingests a raw event payload, honoring `cancel`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Cancelled`] when `cancel` fires before commit,
    /// or any error of [`Self::ingest_payload`].
    pub fn ingest_payload_with_cancel(
        &self,
        payload: &[u8],
        cancel: &CancelToken,
    ) -> Result<IngestReceipt, CatalogError> {
        let event = match self.admit(payload) {
            Ok(event) => event,
            Err(err) => {
                self.reject(None, &err, payload.len());
                return Err(err);
            }
        };
        self.run_logged(payload, &event, cancel)
    }

    /// Ingests an already typed event.
    ///
    /// The canonical JSON encoding of the event is kept as the audit record.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when validation or any pipeline step fails.
    pub fn ingest_event(&self, event: &LineageEvent) -> Result<IngestReceipt, CatalogError> {
        self.ingest_event_with_cancel(event, &CancelToken::new())
    }

    /// Ingests an already typed event, honoring `cancel`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Cancelled`] when `cancel` fires before commit,
    /// or any error of [`Self::ingest_event`].
    pub fn ingest_event_with_cancel(
        &self,
        event: &LineageEvent,
        cancel: &CancelToken,
    ) -> Result<IngestReceipt, CatalogError> {
        let payload = match event.to_vec() {
            Ok(payload) => payload,
            Err(err) => {
                self.reject(Some(event), &err, 0);
                return Err(err);
            }
        };
        if let Err(err) = event.validate().and_then(|()| self.check_limits(&payload, event)) {
            self.reject(Some(event), &err, payload.len());
            return Err(err);
        }
        self.run_logged(&payload, event, cancel)
    }

    /// Logs an event refused before any transaction was opened.
    fn reject(&self, event: Option<&LineageEvent>, err: &CatalogError, payload_bytes: usize) {
        self.log_sink.record(&IngestLogEvent::failed(
            self.clock.now(),
            IngestOutcome::Rejected,
            event,
            err,
            payload_bytes,
        ));
    }

    /// Validates limits and decodes the payload.
    fn admit(&self, payload: &[u8]) -> Result<LineageEvent, CatalogError> {
        if payload.len() > self.config.max_payload_bytes {
            return Err(too_large(payload.len(), self.config.max_payload_bytes));
        }
        let event = LineageEvent::from_slice(payload)?;
        self.check_limits(payload, &event)?;
        Ok(event)
    }

    /// Enforces the configured size limits.
    fn check_limits(&self, payload: &[u8], event: &LineageEvent) -> Result<(), CatalogError> {
        if payload.len() > self.config.max_payload_bytes {
            return Err(too_large(payload.len(), self.config.max_payload_bytes));
        }
        if event.dataset_count() > self.config.max_datasets_per_event {
            return Err(CatalogError::Validation(format!(
                "event references {} datasets (max {})",
                event.dataset_count(),
                self.config.max_datasets_per_event
            )));
        }
        Ok(())
    }

    /// Runs the transactional pipeline and logs its outcome.
    fn run_logged(
        &self,
        payload: &[u8],
        event: &LineageEvent,
        cancel: &CancelToken,
    ) -> Result<IngestReceipt, CatalogError> {
        let now = self.clock.now();
        let result = self.store.transact(|tx| run_pipeline(tx, payload, event, cancel, now));
        let record = match &result {
            Ok(receipt) => IngestLogEvent::committed(now, event, receipt, payload.len()),
            Err(err) => IngestLogEvent::failed(
                now,
                IngestOutcome::RolledBack,
                Some(event),
                err,
                payload.len(),
            ),
        };
        self.log_sink.record(&record);
        result
    }
}

/// Applies one event inside an open transaction.
fn run_pipeline(
    tx: &mut dyn CatalogTx,
    payload: &[u8],
    event: &LineageEvent,
    cancel: &CancelToken,
    now: Timestamp,
) -> Result<IngestReceipt, CatalogError> {
    cancel.checkpoint()?;
    tx.insert_audit_request(payload, now)?;

    let namespace = resolve_job_namespace(tx, &event.job.namespace, now)?;
    let job = upsert_job(tx, namespace.id, &event.job.name, &event.job.facets, now)?.entity;
    let (job, job_version) = ensure_job_version(tx, &job, now)?;
    cancel.checkpoint()?;

    let (run, run_created) = get_or_create_run(
        tx,
        &event.run.run_id,
        event.event_time,
        job_version.id,
        &event.run.facets,
        now,
    )?;
    let run_event = tx.insert_run_event(&NewRunEvent {
        run_id: run.id,
        event_type: event.event_type,
        event_time: event.event_time,
        facets: &event.run.facets,
        created_at: now,
    })?;
    let run = apply_event(tx, &run, &run_event, now)?;

    let mut dataset_versions_created = 0;
    let mut edges_created = 0;
    if event.event_type.is_complete() {
        for dataset in event.datasets() {
            cancel.checkpoint()?;
            let recorded = record_dataset_io(tx, run.id, dataset, now)?;
            dataset_versions_created += recorded.versions_created;
            edges_created += usize::from(recorded.edge_created);
        }
    }
    cancel.checkpoint()?;

    Ok(IngestReceipt {
        run_event_id: run_event.id,
        run_id: run.id,
        job_id: job.id,
        job_version_id: job_version.id,
        event_type: event.event_type,
        event_time: event.event_time,
        run_created,
        dataset_versions_created,
        edges_created,
    })
}

/// Builds the oversize payload error.
fn too_large(actual_bytes: usize, max_bytes: usize) -> CatalogError {
    CatalogError::Validation(format!(
        "payload exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
    ))
}
