// crates/lineage-catalog-store-sqlite/tests/common/mod.rs
// ============================================================================
// Module: SQLite Store Test Fixtures
// Description: Temp-dir store setup and lineage event builders.
// ============================================================================
//! ## Overview
//! Opens stores under a temporary directory and builds event payloads.

#![allow(dead_code, reason = "Each test binary uses a subset of the fixtures.")]
#![allow(clippy::expect_used, reason = "Fixtures fail loudly on setup errors.")]

use std::path::PathBuf;
use std::sync::Arc;

use lineage_catalog_core::FixedClock;
use lineage_catalog_core::IngestConfig;
use lineage_catalog_core::LineageIngestor;
use lineage_catalog_core::Timestamp;
use lineage_catalog_store_sqlite::SqliteCatalogStore;
use lineage_catalog_store_sqlite::SqliteStoreConfig;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

/// Parent run id used by linkage tests.
pub const PARENT_RUN: &str = "0190e0a8-1d1b-7c3e-9a52-0c4f6a1b2c3d";
/// Primary run id.
pub const RUN_A: &str = "3f7c2a10-8b4e-4c1d-9e2f-5a6b7c8d9e01";
/// Secondary run id.
pub const RUN_B: &str = "6a1d9e44-2c3b-4f5a-8d7e-1b2c3d4e5f60";

/// Returns the database path inside `dir`.
pub fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("catalog").join("lineage.db")
}

/// Opens a store inside `dir`.
pub fn open_store(dir: &TempDir) -> SqliteCatalogStore {
    SqliteCatalogStore::new(SqliteStoreConfig::new(db_path(dir))).expect("open store")
}

/// Builds an ingestor over a store inside `dir`.
pub fn ingestor(dir: &TempDir) -> LineageIngestor<SqliteCatalogStore> {
    let now = Timestamp::parse_rfc3339("2026-03-01T12:00:00Z").expect("clock");
    LineageIngestor::new(open_store(dir), IngestConfig::default())
        .expect("ingestor")
        .with_clock(Arc::new(FixedClock(now)))
}

/// Builds a dataset reference carrying a schema facet.
pub fn dataset(namespace: &str, name: &str, fields: &[&str]) -> Value {
    let fields: Vec<Value> =
        fields.iter().map(|name| json!({ "name": name, "type": "BIGINT" })).collect();
    json!({ "namespace": namespace, "name": name, "facets": { "schema": { "fields": fields } } })
}

/// Builds an event with the given run facets and datasets.
pub fn event(
    event_type: &str,
    run_id: &str,
    event_time: &str,
    run_facets: Value,
    inputs: Vec<Value>,
    outputs: Vec<Value>,
) -> Vec<u8> {
    let value = json!({
        "eventType": event_type,
        "eventTime": event_time,
        "run": { "runId": run_id, "facets": run_facets },
        "job": { "namespace": "etl", "name": "daily_orders" },
        "inputs": inputs,
        "outputs": outputs,
    });
    serde_json::to_vec(&value).expect("encode payload")
}

/// Parses an RFC 3339 timestamp.
pub fn ts(value: &str) -> Timestamp {
    Timestamp::parse_rfc3339(value).expect("timestamp")
}
