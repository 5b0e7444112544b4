// crates/lineage-catalog-core/src/runtime/runs.rs
// ============================================================================
// Module: Run State Machine
// Description: Run creation, parent resolution, and per-event projections.
// Purpose: Accumulate run facets and derived fields across a run's events.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A run moves from absent to open when its first event arrives and to
//! closed once a complete event is applied. Closed runs keep accepting
//! events. Creation is one-shot: the parent reference and the nominal
//! window are read from the first event's facets and never revisited.
//!
//! Every event merges its run facets into the cumulative set (shallow,
//! incoming keys win) and re-derives the error projection from the merged
//! result, so the latest error facet always wins.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ExternalRunId;
use crate::core::FacetDocument;
use crate::core::JobVersionId;
use crate::core::NewRun;
use crate::core::Run;
use crate::core::RunEventRecord;
use crate::core::RunFacets;
use crate::core::RunUpdate;
use crate::core::Timestamp;
use crate::core::facets::merge;
use crate::interfaces::CatalogError;
use crate::interfaces::CatalogTx;

// ============================================================================
// SECTION: Creation
// ============================================================================

/// Returns the run for `external_id`, creating it on first sight.
///
/// The boolean is true when the run was created by this call.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] when the facets reference a parent run
/// that has not been ingested, [`CatalogError::Validation`] when the parent
/// id is not a UUID, [`CatalogError::Serialization`] for malformed facets, or
/// any store error.
pub fn get_or_create_run(
    tx: &mut dyn CatalogTx,
    external_id: &ExternalRunId,
    event_time: Timestamp,
    job_version_id: JobVersionId,
    facets: &FacetDocument,
    now: Timestamp,
) -> Result<(Run, bool), CatalogError> {
    if let Some(run) = tx.run_by_external_id(external_id)? {
        return Ok((run, false));
    }
    let view: RunFacets = facets.view()?;
    let parent_run_id = match view.parent_run_id() {
        Some(raw) => {
            let parent_id = ExternalRunId::parse(raw)?;
            let parent = tx
                .run_by_external_id(&parent_id)?
                .ok_or_else(|| CatalogError::not_found("parent run", parent_id))?;
            Some(parent.id)
        }
        None => None,
    };
    let nominal = view.nominal_time.unwrap_or_default();
    let new_run = NewRun {
        external_id: *external_id,
        job_version_id,
        parent_run_id,
        facets,
        nominal_started_at: nominal.nominal_start_time,
        nominal_ended_at: nominal.nominal_end_time,
        started_at: event_time,
        created_at: now,
    };
    if let Some(run) = tx.insert_run(&new_run)? {
        return Ok((run, true));
    }
    let run = tx.run_by_external_id(external_id)?.ok_or_else(|| CatalogError::Conflict {
        entity: "run",
        key: external_id.to_string(),
    })?;
    Ok((run, false))
}

// ============================================================================
// SECTION: Event Application
// ============================================================================

/// Applies an appended run event to the run projection.
///
/// # Errors
///
/// Returns [`CatalogError::Serialization`] when the merged facets carry a
/// malformed error facet, or any store error.
pub fn apply_event(
    tx: &mut dyn CatalogTx,
    run: &Run,
    event: &RunEventRecord,
    now: Timestamp,
) -> Result<Run, CatalogError> {
    let ended_at = if event.event_type.is_complete() { Some(event.event_time) } else { run.ended_at };
    let facets = merge(&run.facets, &event.facets);
    let view: RunFacets = facets.view()?;
    let error = view.error_message.unwrap_or_default();
    tx.update_run(&RunUpdate {
        id: run.id,
        facets: &facets,
        ended_at,
        last_event_type: event.event_type,
        error_message: non_empty(&error.message),
        programming_language: non_empty(&error.programming_language),
        stacktrace: error.stack_trace.as_deref().and_then(non_empty),
        updated_at: now,
    })
}

/// Returns `None` for blank strings.
fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() { None } else { Some(value) }
}
