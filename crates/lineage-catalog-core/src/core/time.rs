// crates/lineage-catalog-core/src/core/time.rs
// ============================================================================
// Module: Lineage Catalog Time Model
// Description: Canonical timestamps and clock sources for catalog records.
// Purpose: Keep event times and bookkeeping times exact across storage round trips.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Catalog timestamps are UTC instants with microsecond precision. Event
//! times arrive as RFC 3339 strings; bookkeeping times (`created_at`,
//! `updated_at`) come from a [`Clock`] owned by the ingestor. The engine never
//! reads wall-clock time directly, so tests can pin time with [`FixedClock`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;

use crate::interfaces::CatalogError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Nanoseconds per microsecond.
const NANOS_PER_MICRO: i128 = 1_000;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// UTC instant used for every catalog timestamp.
///
/// # Invariants
/// - Offset is always UTC.
/// - Sub-microsecond precision is truncated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Normalizes an arbitrary date-time into a catalog timestamp.
    #[must_use]
    pub fn from_datetime(value: OffsetDateTime) -> Self {
        let utc = value.to_offset(UtcOffset::UTC);
        let truncated = utc.unix_timestamp_nanos() / NANOS_PER_MICRO * NANOS_PER_MICRO;
        Self(OffsetDateTime::from_unix_timestamp_nanos(truncated).unwrap_or(utc))
    }

    /// Parses an RFC 3339 timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] when the value is not RFC 3339.
    pub fn parse_rfc3339(value: &str) -> Result<Self, CatalogError> {
        OffsetDateTime::parse(value, &Rfc3339).map(Self::from_datetime).map_err(|err| {
            CatalogError::Validation(format!("invalid rfc3339 timestamp {value:?}: {err}"))
        })
    }

    /// Rebuilds a timestamp from signed unix microseconds.
    #[must_use]
    pub fn from_unix_micros(micros: i64) -> Option<Self> {
        let nanos = i128::from(micros) * NANOS_PER_MICRO;
        OffsetDateTime::from_unix_timestamp_nanos(nanos).ok().map(Self)
    }

    /// Returns the timestamp as signed unix microseconds.
    #[must_use]
    pub fn unix_micros(self) -> i64 {
        let micros = self.0.unix_timestamp_nanos() / NANOS_PER_MICRO;
        i64::try_from(micros).unwrap_or(if micros < 0 { i64::MIN } else { i64::MAX })
    }

    /// Returns the timestamp as unix milliseconds.
    #[must_use]
    pub fn unix_millis(self) -> i64 {
        self.unix_micros() / 1_000
    }

    /// Returns the underlying date-time.
    #[must_use]
    pub const fn as_datetime(&self) -> OffsetDateTime {
        self.0
    }

    /// Formats the timestamp as RFC 3339.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.format(&Rfc3339).unwrap_or_else(|_| self.unix_micros().to_string())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_rfc3339(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Clocks
// ============================================================================

/// Source of bookkeeping timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_datetime(OffsetDateTime::now_utc())
    }
}

/// Clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
