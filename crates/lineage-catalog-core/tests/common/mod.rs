// crates/lineage-catalog-core/tests/common/mod.rs
// ============================================================================
// Module: Lineage Test Fixtures
// Description: Event builders and ingestor setup shared by integration tests.
// ============================================================================
//! ## Overview
//! Builds lineage event payloads as JSON values and wires an in-memory
//! ingestor with a fixed clock and a recording log sink.

#![allow(dead_code, reason = "Each test binary uses a subset of the fixtures.")]
#![allow(clippy::expect_used, reason = "Fixtures fail loudly on malformed inputs.")]

use std::sync::Arc;

use lineage_catalog_core::FixedClock;
use lineage_catalog_core::InMemoryCatalogStore;
use lineage_catalog_core::IngestConfig;
use lineage_catalog_core::LineageIngestor;
use lineage_catalog_core::MemoryIngestLogSink;
use lineage_catalog_core::Timestamp;
use serde_json::Value;
use serde_json::json;

/// Parent run id used by linkage tests.
pub const PARENT_RUN: &str = "0190e0a8-1d1b-7c3e-9a52-0c4f6a1b2c3d";
/// Primary run id.
pub const RUN_A: &str = "3f7c2a10-8b4e-4c1d-9e2f-5a6b7c8d9e01";
/// Secondary run id.
pub const RUN_B: &str = "6a1d9e44-2c3b-4f5a-8d7e-1b2c3d4e5f60";
/// Tertiary run id.
pub const RUN_C: &str = "9b8c7d6e-5f4a-4b3c-8d2e-1f0a9b8c7d6e";

/// Returns the fixed bookkeeping time used by test ingestors.
pub fn clock_time() -> Timestamp {
    Timestamp::parse_rfc3339("2026-03-01T12:00:00Z").expect("clock time")
}

/// Builds an ingestor over a fresh in-memory store.
pub fn ingestor() -> (LineageIngestor<InMemoryCatalogStore>, Arc<MemoryIngestLogSink>) {
    ingestor_with(IngestConfig::default())
}

/// Builds an ingestor with explicit limits.
pub fn ingestor_with(
    config: IngestConfig,
) -> (LineageIngestor<InMemoryCatalogStore>, Arc<MemoryIngestLogSink>) {
    let sink = Arc::new(MemoryIngestLogSink::new());
    let ingestor = LineageIngestor::new(InMemoryCatalogStore::new(), config)
        .expect("ingestor")
        .with_clock(Arc::new(FixedClock(clock_time())))
        .with_log_sink(sink.clone());
    (ingestor, sink)
}

/// Builds a schema facet document for `fields`.
pub fn schema(fields: &[&str]) -> Value {
    let fields: Vec<Value> =
        fields.iter().map(|name| json!({ "name": name, "type": "VARCHAR" })).collect();
    json!({ "schema": { "_producer": "test", "fields": fields } })
}

/// Builds a dataset reference carrying a schema facet.
pub fn dataset(namespace: &str, name: &str, fields: &[&str]) -> Value {
    json!({ "namespace": namespace, "name": name, "facets": schema(fields) })
}

/// Builds an event with empty run facets and no datasets.
pub fn event(event_type: &str, run_id: &str, event_time: &str) -> Value {
    json!({
        "eventType": event_type,
        "eventTime": event_time,
        "run": { "runId": run_id, "facets": {} },
        "job": { "namespace": "etl", "name": "daily_orders", "facets": {} },
        "inputs": [],
        "outputs": [],
        "producer": "https://example.test/producer",
    })
}

/// Sets the run facets of `event`.
pub fn with_run_facets(mut event: Value, facets: Value) -> Value {
    event["run"]["facets"] = facets;
    event
}

/// Sets the job of `event`.
pub fn with_job(mut event: Value, namespace: &str, name: &str) -> Value {
    event["job"]["namespace"] = json!(namespace);
    event["job"]["name"] = json!(name);
    event
}

/// Sets the inputs and outputs of `event`.
pub fn with_io(mut event: Value, inputs: Vec<Value>, outputs: Vec<Value>) -> Value {
    event["inputs"] = Value::Array(inputs);
    event["outputs"] = Value::Array(outputs);
    event
}

/// Returns a parent run facet pointing at `run_id`.
pub fn parent_facet(run_id: &str) -> Value {
    json!({
        "parent": {
            "job": { "namespace": "etl", "name": "orchestrator" },
            "run": { "runId": run_id },
        }
    })
}

/// Encodes a JSON value as payload bytes.
pub fn payload(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).expect("encode payload")
}

/// Parses an RFC 3339 timestamp.
pub fn ts(value: &str) -> Timestamp {
    Timestamp::parse_rfc3339(value).expect("timestamp")
}
