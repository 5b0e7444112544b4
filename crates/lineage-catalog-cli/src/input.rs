// crates/lineage-catalog-cli/src/input.rs
// ============================================================================
// Module: Event File Input
// Description: Splits an event file into individual event payloads.
// Purpose: Accept JSON arrays, single documents, and newline-delimited JSON.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `ingest` command feeds each event to the engine as its own payload so
//! the audit log keeps the exact bytes of that event. Array elements and
//! single documents are sliced out of the source text without re-encoding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::value::RawValue;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while splitting an event file.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum InputError {
    /// The file holds no events.
    #[error("event file contains no events")]
    Empty,
    /// The file is not UTF-8.
    #[error("event file must be utf-8")]
    NotUtf8,
    /// A JSON array could not be parsed.
    #[error("invalid event array: {0}")]
    InvalidArray(String),
}

// ============================================================================
// SECTION: Splitting
// ============================================================================

/// Splits `bytes` into event payloads.
///
/// A leading `[` selects a JSON array. Otherwise the whole file is tried as
/// one JSON document, then as newline-delimited JSON. Lines are passed
/// through untouched so malformed lines fail individually during ingest.
pub(crate) fn split_events(bytes: &[u8]) -> Result<Vec<&[u8]>, InputError> {
    let text = std::str::from_utf8(bytes).map_err(|_| InputError::NotUtf8)?;
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    if trimmed.starts_with('[') {
        let elements: Vec<&RawValue> = serde_json::from_str(trimmed)
            .map_err(|err| InputError::InvalidArray(err.to_string()))?;
        if elements.is_empty() {
            return Err(InputError::Empty);
        }
        return Ok(elements.into_iter().map(|element| element.get().as_bytes()).collect());
    }
    if let Ok(document) = serde_json::from_str::<&RawValue>(trimmed) {
        return Ok(vec![document.get().as_bytes()]);
    }
    let lines: Vec<&[u8]> = trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::as_bytes)
        .collect();
    Ok(lines)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use super::InputError;
    use super::split_events;

    #[test]
    fn array_elements_keep_their_source_text() {
        let events = split_events(b"[ {\"a\": 1},\n  {\"b\" :2} ]").unwrap();
        assert_eq!(events, vec![&b"{\"a\": 1}"[..], &b"{\"b\" :2}"[..]]);
    }

    #[test]
    fn single_pretty_document_is_one_event() {
        let events = split_events(b"{\n  \"eventType\": \"START\"\n}\n").unwrap();
        assert_eq!(events, vec![&b"{\n  \"eventType\": \"START\"\n}"[..]]);
    }

    #[test]
    fn newline_delimited_lines_skip_blanks() {
        let events = split_events(b"{\"a\":1}\r\n\n{\"b\":2}\nnot json\n").unwrap();
        assert_eq!(events, vec![&b"{\"a\":1}"[..], &b"{\"b\":2}"[..], &b"not json"[..]]);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert_eq!(split_events(b"  \n").unwrap_err(), InputError::Empty);
        assert_eq!(split_events(b"[]").unwrap_err(), InputError::Empty);
    }

    #[test]
    fn broken_array_is_rejected() {
        assert!(matches!(split_events(b"[{\"a\":1},"), Err(InputError::InvalidArray(_))));
    }

    #[test]
    fn non_utf8_is_rejected() {
        assert_eq!(split_events(&[0xff, 0xfe]).unwrap_err(), InputError::NotUtf8);
    }
}
