// crates/lineage-catalog-store-sqlite/tests/catalog_pipeline.rs
// ============================================================================
// Module: SQLite Ingestion Pipeline Tests
// Description: End-to-end ingestion against the durable store.
// Purpose: Validate catalog invariants with real SQL constraints in place.
// Dependencies: lineage-catalog-store-sqlite, lineage-catalog-core, proptest, tempfile
// ============================================================================

//! ## Overview
//! Runs the ingestion engine over the SQLite store and checks the catalog
//! properties that depend on constraints and transactions: idempotent
//! entities, schema-driven dataset versions, facet accumulation, atomic
//! rollback, and idempotent edges.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use common::PARENT_RUN;
use common::RUN_A;
use common::RUN_B;
use common::dataset;
use common::event;
use common::ingestor;
use common::ts;
use lineage_catalog_core::CancelToken;
use lineage_catalog_core::CatalogError;
use lineage_catalog_core::EventType;
use lineage_catalog_core::ExternalRunId;
use lineage_catalog_core::IoType;
use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Entities
// ============================================================================

#[test]
fn start_then_complete_reuses_every_entity() {
    let dir = TempDir::new().expect("tempdir");
    let ingestor = ingestor(&dir);

    let start = ingestor
        .ingest_payload(&event("START", RUN_A, "2026-03-01T10:00:00Z", json!({}), vec![], vec![]))
        .expect("start");
    let complete = ingestor
        .ingest_payload(&event(
            "COMPLETE",
            RUN_A,
            "2026-03-01T10:30:00Z",
            json!({}),
            vec![dataset("warehouse", "orders", &["id"])],
            vec![dataset("warehouse", "orders_daily", &["day", "total"])],
        ))
        .expect("complete");

    assert_eq!(start.run_id, complete.run_id);
    assert_eq!(start.job_version_id, complete.job_version_id);
    assert!(start.run_created);
    assert!(!complete.run_created);
    assert_eq!(complete.edges_created, 2);
    let queries = ingestor.queries();
    assert_eq!(queries.list_jobs().expect("jobs").len(), 1);
    assert_eq!(queries.list_datasets().expect("datasets").len(), 2);
    let run = queries.get_run(start.run_id).expect("run");
    assert_eq!(run.ended_at, Some(ts("2026-03-01T10:30:00Z")));
    assert_eq!(run.last_event_type, Some(EventType::Complete));
    let events = queries.list_run_events(start.run_id).expect("events");
    assert_eq!(events.len(), 2);
    assert_eq!(queries.list_audit_requests().expect("audit").len(), 2);
}

#[test]
fn run_facets_merge_and_derive_error_columns() {
    let dir = TempDir::new().expect("tempdir");
    let ingestor = ingestor(&dir);
    ingestor
        .ingest_payload(&event(
            "START",
            RUN_A,
            "2026-03-01T10:00:00Z",
            json!({ "nominalTime": { "nominalStartTime": "2026-03-01T09:00:00Z" } }),
            vec![],
            vec![],
        ))
        .expect("start");
    let receipt = ingestor
        .ingest_payload(&event(
            "FAIL",
            RUN_A,
            "2026-03-01T10:10:00Z",
            json!({ "errorMessage": { "message": "Bang!", "programmingLanguage": "rust" } }),
            vec![],
            vec![],
        ))
        .expect("fail");

    let run = ingestor.queries().get_run(receipt.run_id).expect("run");
    assert_eq!(run.facets.keys().collect::<Vec<_>>(), vec!["errorMessage", "nominalTime"]);
    assert_eq!(run.error_message.as_deref(), Some("Bang!"));
    assert_eq!(run.programming_language.as_deref(), Some("rust"));
    assert_eq!(run.nominal_started_at, Some(ts("2026-03-01T09:00:00Z")));
    assert!(run.ended_at.is_none());
}

#[test]
fn unknown_parent_rolls_back_the_event() {
    let dir = TempDir::new().expect("tempdir");
    let ingestor = ingestor(&dir);
    let parent = json!({
        "parent": { "job": { "namespace": "etl", "name": "dag" }, "run": { "runId": PARENT_RUN } }
    });

    let err = ingestor
        .ingest_payload(&event("START", RUN_A, "2026-03-01T10:00:00Z", parent.clone(), vec![], vec![]))
        .expect_err("missing parent");

    assert!(matches!(err, CatalogError::NotFound { .. }));
    assert!(ingestor.queries().list_audit_requests().expect("audit").is_empty());
    assert!(ingestor.queries().list_jobs().expect("jobs").is_empty());

    let parent_receipt = ingestor
        .ingest_payload(&event("START", PARENT_RUN, "2026-03-01T09:59:00Z", json!({}), vec![], vec![]))
        .expect("parent");
    let child = ingestor
        .ingest_payload(&event("START", RUN_A, "2026-03-01T10:00:00Z", parent, vec![], vec![]))
        .expect("child");
    let run = ingestor.queries().get_run(child.run_id).expect("run");
    assert_eq!(run.parent_run_id, Some(parent_receipt.run_id));
}

#[test]
fn cancelled_ingest_leaves_store_untouched() {
    let dir = TempDir::new().expect("tempdir");
    let ingestor = ingestor(&dir);
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = ingestor
        .ingest_payload_with_cancel(
            &event("START", RUN_A, "2026-03-01T10:00:00Z", json!({}), vec![], vec![]),
            &cancel,
        )
        .expect_err("cancelled");

    assert_eq!(err, CatalogError::Cancelled);
    assert!(ingestor.queries().list_audit_requests().expect("audit").is_empty());
}

// ============================================================================
// SECTION: Versions and Edges
// ============================================================================

#[test]
fn schema_change_mints_version_and_edges_are_idempotent() {
    let dir = TempDir::new().expect("tempdir");
    let ingestor = ingestor(&dir);
    let first = event(
        "COMPLETE",
        RUN_A,
        "2026-03-01T10:00:00Z",
        json!({}),
        vec![],
        vec![dataset("warehouse", "orders", &["a", "b"])],
    );
    ingestor.ingest_payload(&first).expect("first");
    let repeat = ingestor.ingest_payload(&first).expect("repeat");
    let second = ingestor
        .ingest_payload(&event(
            "COMPLETE",
            RUN_B,
            "2026-03-01T11:00:00Z",
            json!({}),
            vec![],
            vec![dataset("warehouse", "orders", &["a", "b", "c"])],
        ))
        .expect("second");

    assert_eq!(repeat.edges_created, 0);
    assert_eq!(second.dataset_versions_created, 1);
    let queries = ingestor.queries();
    let datasets = queries.list_datasets().expect("datasets");
    assert_eq!(datasets.len(), 1);
    let versions = queries.list_dataset_versions(datasets[0].dataset.id).expect("versions");
    assert_eq!(versions.len(), 2);
    assert_eq!(datasets[0].dataset.current_version_id, Some(versions[1].id));
    let mut names: Vec<String> =
        queries.list_fields(versions[1].id).expect("fields").into_iter().map(|f| f.name).collect();
    names.sort();
    assert_eq!(names, vec!["a", "b", "c"]);
    let edges = queries.list_run_edges(second.run_id).expect("edges");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].edge.io_type, IoType::Output);
    assert_eq!(edges[0].dataset_version.id, versions[1].id);
    assert_eq!(edges[0].namespace.name, "warehouse");
}

#[test]
fn start_events_ignore_datasets() {
    let dir = TempDir::new().expect("tempdir");
    let ingestor = ingestor(&dir);

    let receipt = ingestor
        .ingest_payload(&event(
            "START",
            RUN_A,
            "2026-03-01T10:00:00Z",
            json!({}),
            vec![dataset("warehouse", "orders", &["id"])],
            vec![],
        ))
        .expect("start");

    assert_eq!(receipt.edges_created, 0);
    assert!(ingestor.queries().list_datasets().expect("datasets").is_empty());
    let run_id = ExternalRunId::parse(RUN_A).expect("uuid");
    let run = ingestor.queries().get_run_by_external_id(&run_id).expect("run");
    assert!(ingestor.queries().list_run_edges(run.id).expect("edges").is_empty());
}

// ============================================================================
// SECTION: Properties
// ============================================================================

/// Field-name alphabet for generated schemas.
const FIELD_NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn versions_track_field_set_changes(
        schemas in prop::collection::vec(prop::collection::btree_set(0usize..FIELD_NAMES.len(), 0..4), 1..6)
    ) {
        let dir = TempDir::new().expect("tempdir");
        let ingestor = ingestor(&dir);
        let mut expected_versions = 0usize;
        let mut current: Option<&BTreeSet<usize>> = None;
        for (index, schema) in schemas.iter().enumerate() {
            let names: Vec<&str> = schema.iter().map(|idx| FIELD_NAMES[*idx]).collect();
            let run_id = format!("00000000-0000-4000-8000-{index:012}");
            let payload = event(
                "COMPLETE",
                &run_id,
                "2026-03-01T10:00:00Z",
                json!({}),
                vec![],
                vec![dataset("warehouse", "orders", &names)],
            );
            ingestor.ingest_payload(&payload).expect("complete");
            match current {
                Some(stored) if stored == schema => {}
                Some(stored) if stored.is_empty() => current = Some(schema),
                _ => {
                    expected_versions += 1;
                    current = Some(schema);
                }
            }
        }

        let queries = ingestor.queries();
        let datasets = queries.list_datasets().expect("datasets");
        let versions = queries.list_dataset_versions(datasets[0].dataset.id).expect("versions");
        prop_assert_eq!(versions.len(), expected_versions);
        let edges: usize = queries
            .list_runs_for_job_version(
                queries.list_job_versions(queries.list_jobs().expect("jobs")[0].job.id)
                    .expect("job versions")[0]
                    .id,
            )
            .expect("runs")
            .iter()
            .map(|run| queries.list_run_edges(run.id).expect("edges").len())
            .sum();
        prop_assert_eq!(edges, schemas.len());
    }
}
