// crates/lineage-catalog-core/src/runtime/namespaces.rs
// ============================================================================
// Module: Namespace Resolver
// Description: Get-or-create for job and dataset namespaces.
// Purpose: Map namespace names to stable ids inside a catalog transaction.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Jobs and datasets live in two independent namespace pools. Resolution
//! looks the name up first and inserts only when it is missing. The insert
//! is conflict-safe: if another writer created the name in between, the
//! existing row is re-read and returned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::DatasetNamespace;
use crate::core::JobNamespace;
use crate::core::Timestamp;
use crate::interfaces::CatalogError;
use crate::interfaces::CatalogTx;

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Namespace pool selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespacePool {
    /// Namespaces that partition jobs.
    Job,
    /// Namespaces that partition datasets.
    Dataset,
}

impl NamespacePool {
    /// Returns the entity label used in errors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Job => "job namespace",
            Self::Dataset => "dataset namespace",
        }
    }
}

/// Returns the job namespace called `name`, creating it when absent.
///
/// # Errors
///
/// Returns [`CatalogError::Conflict`] when a concurrent insert wins but the
/// row cannot be re-read, or any store error.
pub fn resolve_job_namespace(
    tx: &mut dyn CatalogTx,
    name: &str,
    now: Timestamp,
) -> Result<JobNamespace, CatalogError> {
    if let Some(namespace) = tx.job_namespace_by_name(name)? {
        return Ok(namespace);
    }
    match tx.insert_job_namespace(name, now)? {
        Some(namespace) => Ok(namespace),
        None => tx.job_namespace_by_name(name)?.ok_or_else(|| conflict(NamespacePool::Job, name)),
    }
}

/// Returns the dataset namespace called `name`, creating it when absent.
///
/// # Errors
///
/// Returns [`CatalogError::Conflict`] when a concurrent insert wins but the
/// row cannot be re-read, or any store error.
pub fn resolve_dataset_namespace(
    tx: &mut dyn CatalogTx,
    name: &str,
    now: Timestamp,
) -> Result<DatasetNamespace, CatalogError> {
    if let Some(namespace) = tx.dataset_namespace_by_name(name)? {
        return Ok(namespace);
    }
    match tx.insert_dataset_namespace(name, now)? {
        Some(namespace) => Ok(namespace),
        None => tx
            .dataset_namespace_by_name(name)?
            .ok_or_else(|| conflict(NamespacePool::Dataset, name)),
    }
}

/// Builds the conflict error for a namespace that vanished after a clash.
fn conflict(pool: NamespacePool, name: &str) -> CatalogError {
    CatalogError::Conflict {
        entity: pool.label(),
        key: name.to_string(),
    }
}
