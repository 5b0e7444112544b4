// crates/lineage-catalog-core/src/runtime/versions.rs
// ============================================================================
// Module: Version Manager
// Description: Job snapshots and schema-driven dataset versioning.
// Purpose: Decide when an immutable version must be minted.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A job is versioned exactly once, the first time it is seen; later facet
//! changes do not mint new job versions. A dataset is versioned when the set
//! of field names declared by its schema facet differs from the field set of
//! its current version. Field order and duplicate names do not count as a
//! change. A version's fields are written once and never altered.
//!
//! The `current_version_id` pointer of both entities is always advanced to
//! the version created last.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::Dataset;
use crate::core::DatasetVersion;
use crate::core::DatasetVersionId;
use crate::core::Field;
use crate::core::Job;
use crate::core::JobVersion;
use crate::core::NewDatasetVersion;
use crate::core::NewField;
use crate::core::NewJobVersion;
use crate::core::Timestamp;
use crate::core::facets::SchemaField;
use crate::interfaces::CatalogError;
use crate::interfaces::CatalogTx;

// ============================================================================
// SECTION: Job Versions
// ============================================================================

/// Returns the current version of `job`, snapshotting it when unversioned.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] when the current version pointer
/// references a missing row, or any store error.
pub fn ensure_job_version(
    tx: &mut dyn CatalogTx,
    job: &Job,
    now: Timestamp,
) -> Result<(Job, JobVersion), CatalogError> {
    if let Some(version_id) = job.current_version_id {
        let version = tx
            .job_version(version_id)?
            .ok_or_else(|| CatalogError::not_found("job version", version_id))?;
        return Ok((job.clone(), version));
    }
    let version = tx.insert_job_version(&NewJobVersion {
        job_id: job.id,
        namespace_id: job.namespace_id,
        name: &job.name,
        facets: &job.facets,
        created_at: now,
    })?;
    let job = tx.set_current_job_version(job.id, version.id, now)?;
    Ok((job, version))
}

// ============================================================================
// SECTION: Dataset Versions
// ============================================================================

/// Result of reconciling a dataset against an incoming schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetVersionOutcome {
    /// Dataset after any pointer update.
    pub dataset: Dataset,
    /// Version the dataset reference resolves to.
    pub version: DatasetVersion,
    /// Number of versions created by this call.
    pub versions_created: usize,
}

/// Returns the current version of `dataset`, creating the first one.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] when the current version pointer
/// references a missing row, or any store error.
pub fn ensure_dataset_version(
    tx: &mut dyn CatalogTx,
    dataset: &Dataset,
    now: Timestamp,
) -> Result<DatasetVersionOutcome, CatalogError> {
    if let Some(version_id) = dataset.current_version_id {
        let version = load_dataset_version(tx, version_id)?;
        return Ok(DatasetVersionOutcome {
            dataset: dataset.clone(),
            version,
            versions_created: 0,
        });
    }
    let (dataset, version) = mint_dataset_version(tx, dataset, now)?;
    Ok(DatasetVersionOutcome {
        dataset,
        version,
        versions_created: 1,
    })
}

/// Resolves the dataset version matching `declared` schema fields.
///
/// `declared` is `None` when the event carried no schema facet; the current
/// version is then reused as-is.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] for a dangling version pointer, or any
/// store error.
pub fn reconcile_dataset_version(
    tx: &mut dyn CatalogTx,
    dataset: &Dataset,
    declared: Option<&[SchemaField]>,
    now: Timestamp,
) -> Result<DatasetVersionOutcome, CatalogError> {
    let mut outcome = ensure_dataset_version(tx, dataset, now)?;
    let Some(declared) = declared else {
        return Ok(outcome);
    };
    let stored = tx.fields(outcome.version.id)?;
    if stored.is_empty() {
        attach_fields(tx, outcome.version.id, declared, now)?;
        return Ok(outcome);
    }
    if field_names_match(&stored, declared) {
        return Ok(outcome);
    }
    let (dataset, version) = mint_dataset_version(tx, &outcome.dataset, now)?;
    attach_fields(tx, version.id, declared, now)?;
    outcome.dataset = dataset;
    outcome.version = version;
    outcome.versions_created += 1;
    Ok(outcome)
}

/// Compares stored and declared field-name sets.
#[must_use]
pub fn field_names_match(stored: &[Field], declared: &[SchemaField]) -> bool {
    let stored: BTreeSet<&str> = stored.iter().map(|field| field.name.as_str()).collect();
    let declared: BTreeSet<&str> = declared.iter().map(|field| field.name.as_str()).collect();
    stored == declared
}

/// Creates a new dataset version and makes it current.
fn mint_dataset_version(
    tx: &mut dyn CatalogTx,
    dataset: &Dataset,
    now: Timestamp,
) -> Result<(Dataset, DatasetVersion), CatalogError> {
    let version = tx.insert_dataset_version(&NewDatasetVersion {
        dataset_id: dataset.id,
        namespace_id: dataset.namespace_id,
        name: &dataset.name,
        created_at: now,
    })?;
    let dataset = tx.set_current_dataset_version(dataset.id, version.id, now)?;
    Ok((dataset, version))
}

/// Loads a dataset version or fails with not found.
fn load_dataset_version(
    tx: &mut dyn CatalogTx,
    version_id: DatasetVersionId,
) -> Result<DatasetVersion, CatalogError> {
    tx.dataset_version(version_id)?
        .ok_or_else(|| CatalogError::not_found("dataset version", version_id))
}

/// Writes one field row per declared schema field.
fn attach_fields(
    tx: &mut dyn CatalogTx,
    version_id: DatasetVersionId,
    declared: &[SchemaField],
    now: Timestamp,
) -> Result<(), CatalogError> {
    for field in declared {
        tx.insert_field(&NewField {
            dataset_version_id: version_id,
            name: &field.name,
            data_type: &field.data_type,
            description: field.description.as_deref(),
            created_at: now,
        })?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use proptest::prelude::*;

    use super::*;
    use crate::core::FieldId;

    fn stored(names: &[&str]) -> Vec<Field> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| Field {
                id: FieldId::from_raw(index as u64 + 1).unwrap(),
                dataset_version_id: DatasetVersionId::from_raw(1).unwrap(),
                name: (*name).to_string(),
                data_type: "string".to_string(),
                description: None,
                created_at: Timestamp::from_unix_micros(0).unwrap(),
            })
            .collect()
    }

    fn declared(names: &[&str]) -> Vec<SchemaField> {
        names
            .iter()
            .map(|name| SchemaField {
                name: (*name).to_string(),
                data_type: "string".to_string(),
                description: None,
            })
            .collect()
    }

    #[test]
    fn field_sets_ignore_order_and_duplicates() {
        assert!(field_names_match(&stored(&["a", "b"]), &declared(&["b", "a", "a"])));
        assert!(!field_names_match(&stored(&["a", "b"]), &declared(&["a", "b", "c"])));
        assert!(!field_names_match(&stored(&["a"]), &declared(&[])));
    }

    proptest! {
        #[test]
        fn field_set_match_is_permutation_invariant(
            names in proptest::collection::vec("[a-e]", 1..8),
            seed in any::<u64>(),
        ) {
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut shuffled = refs.clone();
            let len = shuffled.len();
            let rotate = usize::try_from(seed % len as u64).unwrap();
            shuffled.rotate_left(rotate);
            shuffled.reverse();
            prop_assert!(field_names_match(&stored(&refs), &declared(&shuffled)));
        }
    }
}
