// crates/lineage-catalog-core/tests/dataset_versioning.rs
// ============================================================================
// Module: Dataset Versioning Tests
// Description: Schema drift detection and run/dataset-version edges.
// Purpose: Validate version minting, field capture, and edge idempotence.
// Dependencies: lineage-catalog-core
// ============================================================================
//! ## Overview
//! Exercises dataset versioning through complete events: new field sets mint
//! versions, unchanged sets reuse the current version, and edges are written
//! once per run and dataset version.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use common::RUN_A;
use common::RUN_B;
use common::RUN_C;
use common::dataset;
use common::event;
use common::ingestor;
use common::payload;
use common::with_io;
use lineage_catalog_core::CatalogError;
use lineage_catalog_core::DatasetId;
use lineage_catalog_core::DatasetVersionId;
use lineage_catalog_core::InMemoryCatalogStore;
use lineage_catalog_core::IoType;
use lineage_catalog_core::LineageIngestor;
use serde_json::json;

/// Ingests a complete event writing `orders` with `fields`.
fn write_orders(ingestor: &LineageIngestor<InMemoryCatalogStore>, run_id: &str, fields: &[&str]) {
    let complete = with_io(
        event("COMPLETE", run_id, "2026-03-01T10:00:00Z"),
        vec![],
        vec![dataset("warehouse", "orders", fields)],
    );
    ingestor.ingest_payload(&payload(&complete)).expect("complete");
}

/// Returns the only dataset in the catalog.
fn only_dataset(ingestor: &LineageIngestor<InMemoryCatalogStore>) -> DatasetId {
    let datasets = ingestor.queries().list_datasets().expect("datasets");
    assert_eq!(datasets.len(), 1);
    datasets[0].dataset.id
}

/// Returns the sorted field names of a dataset version.
fn field_names(
    ingestor: &LineageIngestor<InMemoryCatalogStore>,
    version: DatasetVersionId,
) -> Vec<String> {
    let mut names: Vec<String> = ingestor
        .queries()
        .list_fields(version)
        .expect("fields")
        .into_iter()
        .map(|field| field.name)
        .collect();
    names.sort();
    names
}

// ============================================================================
// SECTION: Schema Drift
// ============================================================================

#[test]
fn first_sight_mints_version_with_declared_fields() {
    let (ingestor, _) = ingestor();
    write_orders(&ingestor, RUN_A, &["id", "total"]);

    let dataset_id = only_dataset(&ingestor);
    let dataset = ingestor.queries().get_dataset(dataset_id).expect("dataset").dataset;
    let versions = ingestor.queries().list_dataset_versions(dataset_id).expect("versions");
    assert_eq!(versions.len(), 1);
    assert_eq!(dataset.current_version_id, Some(versions[0].id));
    assert_eq!(field_names(&ingestor, versions[0].id), vec!["id", "total"]);
    let fields = ingestor.queries().list_fields(versions[0].id).expect("fields");
    assert!(fields.iter().all(|field| field.data_type == "VARCHAR"));
}

#[test]
fn added_field_mints_new_current_version() {
    let (ingestor, _) = ingestor();
    write_orders(&ingestor, RUN_A, &["a", "b"]);
    write_orders(&ingestor, RUN_B, &["a", "b", "c"]);

    let dataset_id = only_dataset(&ingestor);
    let versions = ingestor.queries().list_dataset_versions(dataset_id).expect("versions");
    assert_eq!(versions.len(), 2);
    let current = ingestor
        .queries()
        .get_dataset(dataset_id)
        .expect("dataset")
        .dataset
        .current_version_id
        .expect("current version");
    assert_eq!(current, versions[1].id);
    assert_eq!(field_names(&ingestor, versions[0].id), vec!["a", "b"]);
    assert_eq!(field_names(&ingestor, current), vec!["a", "b", "c"]);
}

#[test]
fn reordered_field_set_reuses_current_version() {
    let (ingestor, _) = ingestor();
    write_orders(&ingestor, RUN_A, &["a", "b", "c"]);
    write_orders(&ingestor, RUN_B, &["c", "a", "b"]);

    let dataset_id = only_dataset(&ingestor);
    assert_eq!(ingestor.queries().list_dataset_versions(dataset_id).expect("versions").len(), 1);
}

#[test]
fn removed_field_mints_new_version() {
    let (ingestor, _) = ingestor();
    write_orders(&ingestor, RUN_A, &["a", "b"]);
    write_orders(&ingestor, RUN_B, &["a"]);
    write_orders(&ingestor, RUN_C, &["a", "b"]);

    let dataset_id = only_dataset(&ingestor);
    assert_eq!(ingestor.queries().list_dataset_versions(dataset_id).expect("versions").len(), 3);
}

#[test]
fn missing_schema_facet_keeps_current_version() {
    let (ingestor, _) = ingestor();
    write_orders(&ingestor, RUN_A, &["a", "b"]);
    let complete = with_io(
        event("COMPLETE", RUN_B, "2026-03-01T11:00:00Z"),
        vec![],
        vec![json!({ "namespace": "warehouse", "name": "orders" })],
    );
    ingestor.ingest_payload(&payload(&complete)).expect("schemaless");

    let dataset_id = only_dataset(&ingestor);
    let versions = ingestor.queries().list_dataset_versions(dataset_id).expect("versions");
    assert_eq!(versions.len(), 1);
    assert_eq!(field_names(&ingestor, versions[0].id), vec!["a", "b"]);
}

#[test]
fn schemaless_first_sight_mints_empty_version() {
    let (ingestor, _) = ingestor();
    let complete = with_io(
        event("COMPLETE", RUN_A, "2026-03-01T10:00:00Z"),
        vec![json!({ "namespace": "warehouse", "name": "raw_events" })],
        vec![],
    );
    ingestor.ingest_payload(&payload(&complete)).expect("complete");

    let dataset_id = only_dataset(&ingestor);
    let versions = ingestor.queries().list_dataset_versions(dataset_id).expect("versions");
    assert_eq!(versions.len(), 1);
    assert!(field_names(&ingestor, versions[0].id).is_empty());
}

// ============================================================================
// SECTION: Edges
// ============================================================================

#[test]
fn complete_event_links_inputs_and_outputs() {
    let (ingestor, _) = ingestor();
    let mut input = dataset("warehouse", "orders", &["id"]);
    input["inputFacets"] = json!({
        "dataQualityMetrics": { "rowCount": 10, "columnMetrics": {} }
    });
    let mut output = dataset("warehouse", "orders_clean", &["id"]);
    output["outputFacets"] = json!({ "outputStatistics": { "rowCount": 8, "size": 512 } });
    let complete = with_io(event("COMPLETE", RUN_A, "2026-03-01T10:00:00Z"), vec![input], vec![output]);

    let receipt = ingestor.ingest_payload(&payload(&complete)).expect("complete");

    assert_eq!(receipt.edges_created, 2);
    let edges = ingestor.queries().list_run_edges(receipt.run_id).expect("edges");
    assert_eq!(edges.len(), 2);
    let input_edge = edges.iter().find(|edge| edge.edge.io_type == IoType::Input).expect("input");
    assert_eq!(input_edge.namespace.name, "warehouse");
    assert_eq!(input_edge.dataset_version.name, "orders");
    let metrics = input_edge.edge.input_facets().expect("input facets");
    assert_eq!(metrics.data_quality_metrics.expect("metrics").row_count, Some(10));
    let output_edge = edges.iter().find(|edge| edge.edge.io_type == IoType::Output).expect("output");
    let stats = output_edge.edge.output_facets().expect("output facets");
    assert_eq!(stats.output_statistics.expect("stats").row_count, 8);
    assert!(output_edge.edge.dataset_facets.get("schema").is_some());
}

#[test]
fn repeated_complete_event_adds_no_edges() {
    let (ingestor, _) = ingestor();
    let complete = with_io(
        event("COMPLETE", RUN_A, "2026-03-01T10:00:00Z"),
        vec![dataset("warehouse", "orders", &["id"])],
        vec![dataset("warehouse", "orders_clean", &["id"])],
    );
    let raw = payload(&complete);

    let first = ingestor.ingest_payload(&raw).expect("first");
    let second = ingestor.ingest_payload(&raw).expect("second");

    assert_eq!(first.edges_created, 2);
    assert_eq!(second.edges_created, 0);
    assert_eq!(second.dataset_versions_created, 0);
    assert_eq!(ingestor.queries().list_run_edges(first.run_id).expect("edges").len(), 2);
    assert_eq!(ingestor.queries().list_run_events(first.run_id).expect("events").len(), 2);
}

#[test]
fn non_complete_events_record_no_datasets() {
    let (ingestor, _) = ingestor();
    for (event_type, run_id) in [("START", RUN_A), ("RUNNING", RUN_A), ("FAIL", RUN_B), ("ABORT", RUN_C)] {
        let value = with_io(
            event(event_type, run_id, "2026-03-01T10:00:00Z"),
            vec![dataset("warehouse", "orders", &["id"])],
            vec![dataset("warehouse", "orders_clean", &["id"])],
        );
        let receipt = ingestor.ingest_payload(&payload(&value)).expect("ingest");
        assert_eq!(receipt.edges_created, 0);
    }

    assert!(ingestor.queries().list_datasets().expect("datasets").is_empty());
}

#[test]
fn edge_targets_version_current_at_link_time() {
    let (ingestor, _) = ingestor();
    write_orders(&ingestor, RUN_A, &["a"]);
    write_orders(&ingestor, RUN_B, &["a", "b"]);

    let dataset_id = only_dataset(&ingestor);
    let versions = ingestor.queries().list_dataset_versions(dataset_id).expect("versions");
    let run_b = ingestor
        .queries()
        .get_run_by_external_id(&lineage_catalog_core::ExternalRunId::parse(RUN_B).expect("uuid"))
        .expect("run b");
    let edges = ingestor.queries().list_run_edges(run_b.id).expect("edges");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].edge.dataset_version_id, versions[1].id);
}

#[test]
fn latest_dataset_facets_follow_most_recent_edge() {
    let (ingestor, _) = ingestor();
    write_orders(&ingestor, RUN_A, &["a"]);
    let mut output = dataset("warehouse", "orders", &["a"]);
    output["facets"]["storage"] = json!({ "storageLayer": "iceberg", "fileFormat": "parquet" });
    let complete = with_io(event("COMPLETE", RUN_B, "2026-03-01T11:00:00Z"), vec![], vec![output]);
    ingestor.ingest_payload(&payload(&complete)).expect("complete");

    let dataset_id = only_dataset(&ingestor);
    let versions = ingestor.queries().list_dataset_versions(dataset_id).expect("versions");
    assert_eq!(versions.len(), 1);
    let facets = ingestor
        .queries()
        .latest_dataset_facets(versions[0].id)
        .expect("facets")
        .expect("edge exists");
    assert!(facets.get("storage").is_some());
}

#[test]
fn malformed_io_facets_roll_back_the_event() {
    let (ingestor, _) = ingestor();
    let mut output = dataset("warehouse", "orders", &["a"]);
    output["outputFacets"] = json!({ "outputStatistics": { "rowCount": "many" } });
    let complete = with_io(event("COMPLETE", RUN_A, "2026-03-01T10:00:00Z"), vec![], vec![output]);

    let err = ingestor.ingest_payload(&payload(&complete)).expect_err("bad facets");

    assert!(matches!(err, CatalogError::Serialization(_)));
    assert!(ingestor.queries().list_datasets().expect("datasets").is_empty());
    assert!(ingestor.queries().list_jobs().expect("jobs").is_empty());
}

#[test]
fn null_field_type_is_stored_as_empty() {
    let (ingestor, _) = ingestor();
    let output = json!({
        "namespace": "warehouse",
        "name": "orders",
        "facets": { "schema": { "fields": [{ "name": "x", "type": null }] } },
        "outputFacets": { "outputStatistics": { "rowCount": null } }
    });
    let complete = with_io(event("COMPLETE", RUN_A, "2026-03-01T10:00:00Z"), vec![], vec![output]);

    ingestor.ingest_payload(&payload(&complete)).expect("complete");

    let dataset_id = only_dataset(&ingestor);
    let versions = ingestor.queries().list_dataset_versions(dataset_id).expect("versions");
    assert_eq!(versions.len(), 1);
    let fields = ingestor.queries().list_fields(versions[0].id).expect("fields");
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "x");
    assert_eq!(fields[0].data_type, "");
}

#[test]
fn unknown_version_lookups_are_not_found() {
    let (ingestor, _) = ingestor();
    let missing = DatasetVersionId::from_raw(42).expect("nonzero id");

    assert!(matches!(
        ingestor.queries().list_fields(missing),
        Err(CatalogError::NotFound { entity: "dataset version", .. })
    ));
    assert!(matches!(
        ingestor.queries().latest_dataset_facets(missing),
        Err(CatalogError::NotFound { .. })
    ));
}
