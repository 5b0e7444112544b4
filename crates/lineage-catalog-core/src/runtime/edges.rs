// crates/lineage-catalog-core/src/runtime/edges.rs
// ============================================================================
// Module: Run-Dataset Edge Recorder
// Description: Dataset resolution and idempotent run/dataset-version edges.
// Purpose: Record what a completed run read and wrote.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! For each dataset reference of a complete event the recorder resolves the
//! dataset namespace, upserts the dataset, reconciles its schema into a
//! dataset version and links the run to that version. The edge always
//! targets the version that is current when the edge is attempted. An edge
//! that already exists for the pair is left untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::DatasetFacets;
use crate::core::DatasetRef;
use crate::core::DatasetVersion;
use crate::core::InputDatasetFacets;
use crate::core::IoType;
use crate::core::NewEdge;
use crate::core::OutputDatasetFacets;
use crate::core::RunDatasetEdge;
use crate::core::RunId;
use crate::core::Timestamp;
use crate::interfaces::CatalogError;
use crate::interfaces::CatalogTx;
use crate::runtime::entities::upsert_dataset;
use crate::runtime::namespaces::resolve_dataset_namespace;
use crate::runtime::versions::reconcile_dataset_version;

// ============================================================================
// SECTION: Recorder
// ============================================================================

/// Outcome of recording one dataset reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEdge {
    /// Edge as stored (pre-existing or new).
    pub edge: RunDatasetEdge,
    /// Dataset version the edge targets.
    pub version: DatasetVersion,
    /// True when the edge was inserted by this call.
    pub edge_created: bool,
    /// Dataset versions minted while resolving the reference.
    pub versions_created: usize,
}

/// Resolves `dataset` and links it to `run_id`.
///
/// # Errors
///
/// Returns [`CatalogError::Serialization`] for malformed dataset or edge
/// facets, [`CatalogError::Conflict`] for an unrecoverable insert race, or
/// any store error.
pub fn record_dataset_io(
    tx: &mut dyn CatalogTx,
    run_id: RunId,
    dataset: &DatasetRef,
    now: Timestamp,
) -> Result<RecordedEdge, CatalogError> {
    validate_io_facets(dataset)?;
    let view: DatasetFacets = dataset.facets.view()?;
    let namespace = resolve_dataset_namespace(tx, &dataset.namespace, now)?;
    let upserted = upsert_dataset(tx, namespace.id, &dataset.name, &dataset.facets, now)?;
    let outcome = reconcile_dataset_version(tx, &upserted.entity, view.schema_fields(), now)?;
    let (edge, edge_created) = link(tx, run_id, &outcome.version, dataset, now)?;
    Ok(RecordedEdge {
        edge,
        version: outcome.version,
        edge_created,
        versions_created: outcome.versions_created,
    })
}

/// Inserts the edge unless the pair is already linked.
fn link(
    tx: &mut dyn CatalogTx,
    run_id: RunId,
    version: &DatasetVersion,
    dataset: &DatasetRef,
    now: Timestamp,
) -> Result<(RunDatasetEdge, bool), CatalogError> {
    if let Some(edge) = tx.edge(run_id, version.id)? {
        return Ok((edge, false));
    }
    let new_edge = NewEdge {
        run_id,
        dataset_version_id: version.id,
        io_type: dataset.io_type,
        io_facets: &dataset.io_facets,
        dataset_facets: &dataset.facets,
        created_at: now,
    };
    if let Some(edge) = tx.insert_edge(&new_edge)? {
        return Ok((edge, true));
    }
    let edge = tx.edge(run_id, version.id)?.ok_or_else(|| CatalogError::Conflict {
        entity: "run dataset edge",
        key: format!("{run_id}/{}", version.id),
    })?;
    Ok((edge, false))
}

/// Checks that edge facets decode as the typed view for their direction.
fn validate_io_facets(dataset: &DatasetRef) -> Result<(), CatalogError> {
    match dataset.io_type {
        IoType::Input => dataset.io_facets.view::<InputDatasetFacets>().map(drop),
        IoType::Output => dataset.io_facets.view::<OutputDatasetFacets>().map(drop),
    }
}
