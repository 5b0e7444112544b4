// crates/lineage-catalog-config/src/lib.rs
// ============================================================================
// Module: Lineage Catalog Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for lineage-catalog.toml semantics.
// Dependencies: lineage-catalog-core, lineage-catalog-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `lineage-catalog-config` defines the configuration model for the lineage
//! catalog. Configuration is parsed once at process start, validated
//! fail-closed, and handed to constructors as plain values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
