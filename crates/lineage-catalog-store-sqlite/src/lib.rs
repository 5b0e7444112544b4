// crates/lineage-catalog-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Lineage Catalog Store
// Description: Durable CatalogStore backend using SQLite WAL.
// Purpose: Provide production persistence for the lineage catalog.
// Dependencies: lineage-catalog-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`CatalogStore`] implementation. One
//! table per catalog entity carries the uniqueness constraints that make
//! conflict-safe inserts possible, and every unit of work runs in a single
//! transaction so a failed event leaves no partial state behind.
//!
//! [`CatalogStore`]: lineage_catalog_core::CatalogStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;
pub mod tx;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SCHEMA_VERSION;
pub use store::SqliteCatalogStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
pub use tx::SqliteCatalogTx;
