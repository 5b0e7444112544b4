// crates/lineage-catalog-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for the lineage-catalog binary.
// Purpose: Ensure ingest and inspection commands round-trip through SQLite.
// Dependencies: lineage-catalog-cli binary, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Runs the CLI binary against a temporary config and database: ingests event
//! files, inspects the resulting catalog, and checks failure exit codes.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const RUN_ID: &str = "3f7c2a10-8b4e-4c1d-9e2f-5a6b7c8d9e01";

fn lineage_catalog_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_lineage-catalog"))
}

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("lineage-catalog.toml");
    let db = dir.path().join("lineage.db");
    let log = dir.path().join("ingest.jsonl");
    let config = format!(
        "[store]\npath = {db:?}\n\n[logging]\nsink = \"file\"\npath = {log:?}\n",
        db = db.to_string_lossy(),
        log = log.to_string_lossy(),
    );
    fs::write(&path, config).expect("write config");
    path
}

fn run_cli(config: &Path, args: &[&str]) -> Output {
    Command::new(lineage_catalog_bin())
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("LINEAGE_CATALOG_CONFIG")
        .output()
        .expect("run lineage-catalog")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!("stdout is not json ({err}): {}", String::from_utf8_lossy(&output.stdout))
    })
}

fn event(event_type: &str, time: &str, outputs: &[&str]) -> Value {
    let fields: Vec<Value> = outputs.iter().map(|name| json!({ "name": name })).collect();
    json!({
        "eventType": event_type,
        "eventTime": time,
        "run": { "runId": RUN_ID },
        "job": { "namespace": "etl", "name": "daily_orders" },
        "inputs": [],
        "outputs": [
            { "namespace": "warehouse", "name": "orders", "facets": { "schema": { "fields": fields } } }
        ],
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn ingest_then_inspect_catalog() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir);
    let events = dir.path().join("events.json");
    let payload = json!([
        event("START", "2026-03-01T10:00:00Z", &["id"]),
        event("COMPLETE", "2026-03-01T10:05:00Z", &["id", "total"]),
    ]);
    fs::write(&events, payload.to_string()).expect("write events");

    let ingest = run_cli(&config, &["ingest", events.to_string_lossy().as_ref()]);
    assert!(ingest.status.success(), "stderr: {}", String::from_utf8_lossy(&ingest.stderr));
    let report = stdout_json(&ingest);
    assert_eq!(report["committed"], 2);
    assert_eq!(report["failed"], 0);
    assert_eq!(report["events"][1]["status"], "committed");

    let jobs = stdout_json(&run_cli(&config, &["jobs", "list"]));
    assert_eq!(jobs.as_array().expect("jobs").len(), 1);
    assert_eq!(jobs[0]["job"]["name"], "daily_orders");
    assert_eq!(jobs[0]["namespace"]["name"], "etl");

    let datasets = stdout_json(&run_cli(&config, &["datasets", "list"]));
    assert_eq!(datasets[0]["dataset"]["name"], "orders");
    let fields = stdout_json(&run_cli(&config, &["datasets", "fields", "1"]));
    let mut names: Vec<&str> =
        fields.as_array().expect("fields").iter().filter_map(|f| f["name"].as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["id", "total"]);

    let run = stdout_json(&run_cli(&config, &["runs", "show", RUN_ID]));
    assert_eq!(run["last_event_type"], "complete");
    let edges = stdout_json(&run_cli(&config, &["runs", "edges", RUN_ID]));
    assert_eq!(edges.as_array().expect("edges").len(), 1);
    let events = stdout_json(&run_cli(&config, &["runs", "events", "1"]));
    assert_eq!(events.as_array().expect("events").len(), 2);

    let requests = stdout_json(&run_cli(&config, &["requests", "list"]));
    assert_eq!(requests.as_array().expect("requests").len(), 2);
    assert!(requests[0]["payload"].as_str().expect("payload").contains("START"));

    let log = fs::read_to_string(dir.path().join("ingest.jsonl")).expect("ingest log");
    assert_eq!(log.lines().count(), 2);
}

#[test]
fn ingest_reports_failures_and_exits_non_zero() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir);
    let events = dir.path().join("events.ndjson");
    let good = event("START", "2026-03-01T10:00:00Z", &[]);
    fs::write(&events, format!("{good}\n{{\"eventType\": \"START\"}}\n")).expect("write events");

    let output = run_cli(&config, &["ingest", events.to_string_lossy().as_ref()]);

    assert!(!output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["committed"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["events"][1]["status"], "failed");
    assert_eq!(report["events"][1]["index"], 1);
    let requests = stdout_json(&run_cli(&config, &["requests", "list"]));
    assert_eq!(requests.as_array().expect("requests").len(), 1);
}

#[test]
fn unknown_ids_fail_with_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir);

    let output = run_cli(&config, &["jobs", "show", "42"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not_found"), "unexpected stderr: {stderr}");
}

#[test]
fn config_validate_accepts_valid_config() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir);

    let output = run_cli(&config, &["config", "validate"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Config valid"), "unexpected stdout: {stdout}");
}

#[test]
fn config_validate_rejects_invalid_config() {
    let dir = TempDir::new().expect("tempdir");
    let config = dir.path().join("lineage-catalog.toml");
    fs::write(&config, "[logging]\nsink = \"file\"\n").expect("write config");

    let output = run_cli(&config, &["config", "validate"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("requires logging.path"), "unexpected stderr: {stderr}");
}
