// crates/lineage-catalog-core/src/core/identifiers.rs
// ============================================================================
// Module: Lineage Catalog Identifiers
// Description: Surrogate and external identifiers for catalog entities.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! Every catalog table is keyed by a store-assigned surrogate identifier. Each
//! entity gets its own newtype so a dataset version id can never be passed
//! where a job version id is expected. Surrogate identifiers are non-zero and
//! serialize as plain numbers. Runs are additionally addressed by the
//! caller-supplied [`ExternalRunId`], which must be a UUID.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::interfaces::CatalogError;

// ============================================================================
// SECTION: Surrogate Identifiers
// ============================================================================

/// Declares a non-zero surrogate identifier newtype.
macro_rules! surrogate_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        ///
        /// # Invariants
        /// - Always >= 1 (non-zero, assigned by the store).
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            #[doc = concat!("Creates a new ", $label, " identifier from a non-zero value.")]
            #[must_use]
            pub const fn new(id: NonZeroU64) -> Self {
                Self(id)
            }

            #[doc = concat!("Creates a ", $label, " identifier from a raw value (returns `None` if zero).")]
            #[must_use]
            pub fn from_raw(raw: u64) -> Option<Self> {
                NonZeroU64::new(raw).map(Self)
            }

            /// Returns the raw identifier value (always >= 1).
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.get().fmt(f)
            }
        }
    };
}

surrogate_identifier!(
    /// Identifier of a namespace in the job pool.
    JobNamespaceId,
    "job namespace"
);
surrogate_identifier!(
    /// Identifier of a namespace in the dataset pool.
    DatasetNamespaceId,
    "dataset namespace"
);
surrogate_identifier!(
    /// Identifier of a job.
    JobId,
    "job"
);
surrogate_identifier!(
    /// Identifier of an immutable job version.
    JobVersionId,
    "job version"
);
surrogate_identifier!(
    /// Identifier of a dataset.
    DatasetId,
    "dataset"
);
surrogate_identifier!(
    /// Identifier of an immutable dataset version.
    DatasetVersionId,
    "dataset version"
);
surrogate_identifier!(
    /// Identifier of a schema field attached to a dataset version.
    FieldId,
    "field"
);
surrogate_identifier!(
    /// Internal identifier of a run.
    RunId,
    "run"
);
surrogate_identifier!(
    /// Identifier of an appended run event row.
    RunEventId,
    "run event"
);
surrogate_identifier!(
    /// Identifier of a raw audit request row.
    AuditRequestId,
    "audit request"
);

// ============================================================================
// SECTION: External Identifiers
// ============================================================================

/// Caller-supplied run identifier carried on every inbound event.
///
/// # Invariants
/// - Always a syntactically valid UUID.
/// - Displays in lowercase hyphenated form, which is also the persisted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalRunId(Uuid);

impl ExternalRunId {
    /// Wraps an already parsed UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Parses an external run identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] when `value` is not a UUID.
    pub fn parse(value: &str) -> Result<Self, CatalogError> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|err| {
            CatalogError::Validation(format!("run id {value:?} is not a valid uuid: {err}"))
        })
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ExternalRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for ExternalRunId {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use super::*;

    #[test]
    fn surrogate_identifiers_reject_zero() {
        assert!(JobId::from_raw(0).is_none());
        assert_eq!(JobId::from_raw(7).map(JobId::get), Some(7));
        assert_eq!(DatasetVersionId::from_raw(12).unwrap().to_string(), "12");
    }

    #[test]
    fn external_run_id_normalizes_case() {
        let id = ExternalRunId::parse("3F5E83FA-3480-44FF-99C5-FF943904E5E8").unwrap();
        assert_eq!(id.to_string(), "3f5e83fa-3480-44ff-99c5-ff943904e5e8");
    }

    #[test]
    fn external_run_id_rejects_garbage() {
        let err = ExternalRunId::parse("not-a-run").unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }
}
