// crates/lineage-catalog-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for file read size enforcement in the CLI entry point.
// Purpose: Ensure bounded reads fail closed on oversized inputs.
// Dependencies: lineage-catalog-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Validates `read_bytes_with_limit` enforces size limits for event files.

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

use clap::CommandFactory;
use tempfile::TempDir;

use super::Cli;
use super::ReadLimitError;
use super::read_bytes_with_limit;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn read_bytes_with_limit_allows_small_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("events.json");
    fs::write(&path, b"[]").expect("write");

    let bytes = read_bytes_with_limit(&path, 2).expect("read");

    assert_eq!(bytes, b"[]");
}

#[test]
fn read_bytes_with_limit_rejects_large_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("events.json");
    fs::write(&path, b"[{}]").expect("write");

    let err = read_bytes_with_limit(&path, 2).expect_err("too large");

    match err {
        ReadLimitError::TooLarge {
            size,
            limit,
        } => {
            assert_eq!(size, 4);
            assert_eq!(limit, 2);
        }
        ReadLimitError::Io(err) => panic!("unexpected io error: {err}"),
    }
}

#[test]
fn read_bytes_with_limit_reports_missing_file() {
    let dir = TempDir::new().expect("tempdir");

    let err = read_bytes_with_limit(&dir.path().join("absent.json"), 16).expect_err("missing");

    assert!(matches!(err, ReadLimitError::Io(_)));
}
