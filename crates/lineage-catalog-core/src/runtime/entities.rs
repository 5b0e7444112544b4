// crates/lineage-catalog-core/src/runtime/entities.rs
// ============================================================================
// Module: Entity Upserter
// Description: Get-or-create for jobs and datasets with facet refresh.
// Purpose: Keep one row per (namespace, name) with the latest facets.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Jobs and datasets are keyed by `(namespace, name)`. A missing entity is
//! created with the incoming facets and no current version. An existing
//! entity keeps its id; its facets are rewritten only when the canonical
//! encoding of the stored facets differs from the incoming one. Facet drift
//! never mints a version.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Dataset;
use crate::core::DatasetFacets;
use crate::core::DatasetNamespaceId;
use crate::core::FacetDocument;
use crate::core::Job;
use crate::core::JobFacets;
use crate::core::JobNamespaceId;
use crate::core::NewDataset;
use crate::core::NewJob;
use crate::core::Timestamp;
use crate::interfaces::CatalogError;
use crate::interfaces::CatalogTx;

// ============================================================================
// SECTION: Upserts
// ============================================================================

/// Outcome of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted<T> {
    /// Stored entity after the upsert.
    pub entity: T,
    /// True when the entity was created by this call.
    pub created: bool,
    /// True when existing facets were replaced.
    pub facets_updated: bool,
}

/// Returns the job `(namespace_id, name)`, creating or refreshing it.
///
/// # Errors
///
/// Returns [`CatalogError::Serialization`] for malformed job facets,
/// [`CatalogError::Conflict`] for an unrecoverable insert race, or any store
/// error.
pub fn upsert_job(
    tx: &mut dyn CatalogTx,
    namespace_id: JobNamespaceId,
    name: &str,
    facets: &FacetDocument,
    now: Timestamp,
) -> Result<Upserted<Job>, CatalogError> {
    facets.view::<JobFacets>()?;
    if let Some(job) = tx.job_by_name(namespace_id, name)? {
        return refresh_job(tx, job, facets, now);
    }
    let new_job = NewJob {
        namespace_id,
        name,
        facets,
        created_at: now,
    };
    if let Some(job) = tx.insert_job(&new_job)? {
        return Ok(Upserted {
            entity: job,
            created: true,
            facets_updated: false,
        });
    }
    let job = tx.job_by_name(namespace_id, name)?.ok_or_else(|| CatalogError::Conflict {
        entity: "job",
        key: format!("{namespace_id}/{name}"),
    })?;
    refresh_job(tx, job, facets, now)
}

/// Rewrites job facets when they drifted.
fn refresh_job(
    tx: &mut dyn CatalogTx,
    job: Job,
    facets: &FacetDocument,
    now: Timestamp,
) -> Result<Upserted<Job>, CatalogError> {
    if job.facets.encode() == facets.encode() {
        return Ok(Upserted {
            entity: job,
            created: false,
            facets_updated: false,
        });
    }
    let job = tx.update_job_facets(job.id, facets, now)?;
    Ok(Upserted {
        entity: job,
        created: false,
        facets_updated: true,
    })
}

/// Returns the dataset `(namespace_id, name)`, creating or refreshing it.
///
/// # Errors
///
/// Returns [`CatalogError::Serialization`] for malformed dataset facets,
/// [`CatalogError::Conflict`] for an unrecoverable insert race, or any store
/// error.
pub fn upsert_dataset(
    tx: &mut dyn CatalogTx,
    namespace_id: DatasetNamespaceId,
    name: &str,
    facets: &FacetDocument,
    now: Timestamp,
) -> Result<Upserted<Dataset>, CatalogError> {
    facets.view::<DatasetFacets>()?;
    if let Some(dataset) = tx.dataset_by_name(namespace_id, name)? {
        return refresh_dataset(tx, dataset, facets, now);
    }
    let new_dataset = NewDataset {
        namespace_id,
        name,
        facets,
        created_at: now,
    };
    if let Some(dataset) = tx.insert_dataset(&new_dataset)? {
        return Ok(Upserted {
            entity: dataset,
            created: true,
            facets_updated: false,
        });
    }
    let dataset =
        tx.dataset_by_name(namespace_id, name)?.ok_or_else(|| CatalogError::Conflict {
            entity: "dataset",
            key: format!("{namespace_id}/{name}"),
        })?;
    refresh_dataset(tx, dataset, facets, now)
}

/// Rewrites dataset facets when they drifted.
fn refresh_dataset(
    tx: &mut dyn CatalogTx,
    dataset: Dataset,
    facets: &FacetDocument,
    now: Timestamp,
) -> Result<Upserted<Dataset>, CatalogError> {
    if dataset.facets.encode() == facets.encode() {
        return Ok(Upserted {
            entity: dataset,
            created: false,
            facets_updated: false,
        });
    }
    let dataset = tx.update_dataset_facets(dataset.id, facets, now)?;
    Ok(Upserted {
        entity: dataset,
        created: false,
        facets_updated: true,
    })
}
