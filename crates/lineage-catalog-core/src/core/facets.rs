// crates/lineage-catalog-core/src/core/facets.rs
// ============================================================================
// Module: Lineage Facet Codec
// Description: Raw facet documents, typed facet views, and shallow merge.
// Purpose: Give every component one codec for facet payloads.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Facets are open-ended JSON objects attached to jobs, datasets, runs and
//! run/dataset edges. The catalog persists them as [`FacetDocument`]s, which
//! keep every key the producer sent. Components that need structure decode a
//! typed view ([`RunFacets`], [`JobFacets`], [`DatasetFacets`],
//! [`InputDatasetFacets`], [`OutputDatasetFacets`]) on demand.
//!
//! Views are lenient: a missing or `null` facet decodes to its default value,
//! and unrecognized top-level facets are kept in the view's `other` map.
//! Only structurally wrong payloads (a string where an object is expected,
//! for example) fail with [`CatalogError::Serialization`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::core::time::Timestamp;
use crate::interfaces::CatalogError;

// ============================================================================
// SECTION: Facet Document
// ============================================================================

/// Raw facet document as received from a producer.
///
/// # Invariants
/// - Always a JSON object; absent facets are the empty document.
/// - Encoding is canonical (sorted keys, compact form).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetDocument(Map<String, Value>);

impl FacetDocument {
    /// Creates an empty facet document.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wraps an existing JSON object.
    #[must_use]
    pub const fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Converts a JSON value into a facet document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`] when the value is neither an
    /// object nor `null`.
    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => Ok(Self(map)),
            other => Err(CatalogError::Serialization(format!(
                "facets must be a json object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Returns true when no facets are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of top-level facets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a top-level facet by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Inserts or replaces a top-level facet.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Returns the top-level facet keys in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the wrapped JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Decodes a typed view of this document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`] when a recognized facet has
    /// the wrong shape.
    pub fn view<T: DeserializeOwned>(&self) -> Result<T, CatalogError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|err| CatalogError::Serialization(format!("facet view decode failed: {err}")))
    }

    /// Builds a document from a typed view.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`] when the view does not encode
    /// to a JSON object.
    pub fn from_view<T: Serialize>(view: &T) -> Result<Self, CatalogError> {
        let value = serde_json::to_value(view)
            .map_err(|err| CatalogError::Serialization(format!("facet view encode failed: {err}")))?;
        Self::from_value(value)
    }

    /// Encodes the document canonically.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        // A map of JSON values always serializes.
        serde_json::to_vec(&self.0).unwrap_or_default()
    }

    /// Encodes the document for a nullable storage column.
    #[must_use]
    pub fn encode_nullable(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        serde_json::to_string(&self.0).ok()
    }
}

impl From<Map<String, Value>> for FacetDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Decodes a facet document from raw bytes.
///
/// Empty input and JSON `null` both decode to the empty document.
///
/// # Errors
///
/// Returns [`CatalogError::Serialization`] when the bytes are not JSON or not
/// a JSON object.
pub fn decode_facets(bytes: &[u8]) -> Result<FacetDocument, CatalogError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(FacetDocument::new());
    }
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| CatalogError::Serialization(format!("malformed facet document: {err}")))?;
    FacetDocument::from_value(value)
}

/// Encodes a typed facet view canonically.
///
/// # Errors
///
/// Returns [`CatalogError::Serialization`] when the view cannot be encoded.
pub fn encode_view<T: Serialize>(view: &T) -> Result<Vec<u8>, CatalogError> {
    FacetDocument::from_view(view).map(|document| document.encode())
}

/// Merges two facet documents key by key.
///
/// The result holds every top-level key from both inputs. Keys present in
/// both take the `incoming` value; nested objects are replaced, not merged.
#[must_use]
pub fn merge(existing: &FacetDocument, incoming: &FacetDocument) -> FacetDocument {
    let mut merged = existing.0.clone();
    for (key, value) in &incoming.0 {
        merged.insert(key.clone(), value.clone());
    }
    FacetDocument(merged)
}

/// Returns a short label for a JSON value kind.
pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deserializes a value, mapping an explicit `null` to the default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// SECTION: Shared Facet Parts
// ============================================================================

/// Provenance markers carried by every individual facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetMeta {
    /// URI of the producer that emitted the facet.
    #[serde(
        rename = "_producer",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "String::is_empty"
    )]
    pub producer: String,
    /// URI of the facet's JSON schema.
    #[serde(
        rename = "_schemaURL",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "String::is_empty"
    )]
    pub schema_url: String,
}

/// Ownership facet shared by jobs and datasets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnershipFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Declared owners.
    #[serde(deserialize_with = "nullable")]
    pub owners: Vec<Owner>,
}

/// One declared owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Owner {
    /// Owner identifier, for example `team:data-platform`.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Owner role.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub owner_type: Option<String>,
}

// ============================================================================
// SECTION: Run Facets
// ============================================================================

/// Typed view of run facets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFacets {
    /// Scheduled time window of the run.
    #[serde(
        rename = "nominalTime",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub nominal_time: Option<NominalTimeFacet>,
    /// Reference to the parent run that triggered this run.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRunFacet>,
    /// Failure details reported by the run.
    #[serde(
        rename = "errorMessage",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<ErrorMessageFacet>,
    /// Identifier of the query in an external system.
    #[serde(
        rename = "externalQuery",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_query: Option<ExternalQueryFacet>,
    /// Unrecognized facets, kept verbatim.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl RunFacets {
    /// Returns the external id of the parent run, when one is declared.
    #[must_use]
    pub fn parent_run_id(&self) -> Option<&str> {
        self.parent
            .as_ref()
            .map(|parent| parent.run.run_id.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Nominal (scheduled) time window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NominalTimeFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Scheduled start.
    #[serde(rename = "nominalStartTime", skip_serializing_if = "Option::is_none")]
    pub nominal_start_time: Option<Timestamp>,
    /// Scheduled end.
    #[serde(rename = "nominalEndTime", skip_serializing_if = "Option::is_none")]
    pub nominal_end_time: Option<Timestamp>,
}

/// Parent run reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentRunFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Job of the parent run.
    #[serde(deserialize_with = "nullable")]
    pub job: ParentJob,
    /// The parent run itself.
    #[serde(deserialize_with = "nullable")]
    pub run: ParentRun,
}

/// Job identity inside a parent reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentJob {
    /// Job namespace.
    #[serde(deserialize_with = "nullable")]
    pub namespace: String,
    /// Job name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
}

/// Run identity inside a parent reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentRun {
    /// External run id of the parent.
    #[serde(deserialize_with = "nullable", rename = "runId", alias = "id")]
    pub run_id: String,
}

/// Error details for a failed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorMessageFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Human readable error message.
    #[serde(deserialize_with = "nullable")]
    pub message: String,
    /// Language the failing program was written in.
    #[serde(deserialize_with = "nullable", rename = "programmingLanguage")]
    pub programming_language: String,
    /// Stack trace, when available.
    #[serde(rename = "stackTrace", alias = "stacktrace", skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

/// External query reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalQueryFacet {
    /// Query id in the external system.
    #[serde(deserialize_with = "nullable", rename = "externalQueryId")]
    pub external_query_id: String,
    /// Name of the external system.
    #[serde(deserialize_with = "nullable")]
    pub source: String,
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
}

// ============================================================================
// SECTION: Job Facets
// ============================================================================

/// Typed view of job facets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFacets {
    /// Free-form documentation.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub documentation: Option<DocumentationFacet>,
    /// Job owners.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub ownership: Option<OwnershipFacet>,
    /// Inline source code.
    #[serde(
        rename = "sourceCode",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_code: Option<SourceCodeFacet>,
    /// Location of the source code in version control.
    #[serde(
        rename = "sourceCodeLocation",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_code_location: Option<SourceCodeLocationFacet>,
    /// SQL text executed by the job.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub sql: Option<SqlFacet>,
    /// Processing type and integration of the job.
    #[serde(
        rename = "jobType",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub job_type: Option<JobTypeFacet>,
    /// Unrecognized facets, kept verbatim.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Documentation facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Description text.
    #[serde(deserialize_with = "nullable")]
    pub description: String,
}

/// Source code facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCodeFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Source language.
    #[serde(deserialize_with = "nullable")]
    pub language: String,
    /// Source text.
    #[serde(deserialize_with = "nullable", rename = "sourceCode")]
    pub source_code: String,
}

/// Source code location facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCodeLocationFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Version control system, for example `git`.
    #[serde(deserialize_with = "nullable", rename = "type")]
    pub location_type: String,
    /// URL of the file.
    #[serde(deserialize_with = "nullable")]
    pub url: String,
    /// URL of the repository.
    #[serde(rename = "repoUrl", skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    /// Path within the repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Revision identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Tag name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Branch name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// SQL facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Query text.
    #[serde(deserialize_with = "nullable")]
    pub query: String,
}

/// Job type facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobTypeFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// `BATCH` or `STREAMING`.
    #[serde(deserialize_with = "nullable", rename = "processingType")]
    pub processing_type: String,
    /// Integration name, for example `SPARK`.
    #[serde(deserialize_with = "nullable")]
    pub integration: String,
    /// Integration specific job type.
    #[serde(rename = "jobType", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
}

// ============================================================================
// SECTION: Dataset Facets
// ============================================================================

/// Typed view of dataset-level facets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFacets {
    /// Declared schema.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaFacet>,
    /// Column level lineage.
    #[serde(
        rename = "columnLineage",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub column_lineage: Option<ColumnLineageFacet>,
    /// Dataset owners.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub ownership: Option<OwnershipFacet>,
    /// Storage layer and file format.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageFacet>,
    /// Data source the dataset lives in.
    #[serde(
        rename = "dataSource",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_source: Option<DataSourceFacet>,
    /// Data quality assertions evaluated against the dataset.
    #[serde(
        rename = "dataQualityAssertions",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_quality_assertions: Option<DataQualityAssertionsFacet>,
    /// Lifecycle change applied by the run.
    #[serde(
        rename = "lifecycleStateChange",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub lifecycle_state_change: Option<LifecycleStateChangeFacet>,
    /// Alternative identifiers of the dataset.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub symlinks: Option<SymlinksFacet>,
    /// Unrecognized facets, kept verbatim.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl DatasetFacets {
    /// Returns the declared schema fields in order, or `None` when no schema
    /// facet was sent.
    #[must_use]
    pub fn schema_fields(&self) -> Option<&[SchemaField]> {
        self.schema.as_ref().map(|schema| schema.fields.as_slice())
    }
}

/// Schema facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Ordered field list.
    #[serde(deserialize_with = "nullable")]
    pub fields: Vec<SchemaField>,
}

/// One declared schema field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaField {
    /// Field name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Declared data type.
    #[serde(deserialize_with = "nullable", rename = "type")]
    pub data_type: String,
    /// Field description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Column lineage facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLineageFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Contributing inputs keyed by output field name.
    #[serde(deserialize_with = "nullable")]
    pub fields: BTreeMap<String, ColumnLineageField>,
}

/// Inputs contributing to one output field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLineageField {
    /// Contributing input fields.
    #[serde(rename = "inputFields", deserialize_with = "nullable")]
    pub input_fields: Vec<ColumnLineageInput>,
    /// Transformation description.
    #[serde(rename = "transformationDescription", skip_serializing_if = "Option::is_none")]
    pub transformation_description: Option<String>,
    /// Transformation type, for example `IDENTITY`.
    #[serde(rename = "transformationType", skip_serializing_if = "Option::is_none")]
    pub transformation_type: Option<String>,
}

/// One input field contributing to an output field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLineageInput {
    /// Input dataset namespace.
    #[serde(deserialize_with = "nullable")]
    pub namespace: String,
    /// Input dataset name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Input field name.
    #[serde(deserialize_with = "nullable")]
    pub field: String,
    /// Transformation description for this input.
    #[serde(rename = "transformationDescription", skip_serializing_if = "Option::is_none")]
    pub transformation_description: Option<String>,
    /// Transformation type for this input.
    #[serde(rename = "transformationType", skip_serializing_if = "Option::is_none")]
    pub transformation_type: Option<String>,
}

/// Storage facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Storage layer, for example `iceberg`.
    #[serde(deserialize_with = "nullable", rename = "storageLayer")]
    pub storage_layer: String,
    /// File format, for example `parquet`.
    #[serde(deserialize_with = "nullable", rename = "fileFormat")]
    pub file_format: String,
}

/// Data source facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Data source name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Data source URI.
    #[serde(deserialize_with = "nullable")]
    pub uri: String,
}

/// Data quality assertions facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataQualityAssertionsFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Evaluated assertions.
    #[serde(deserialize_with = "nullable")]
    pub assertions: Vec<DataQualityAssertion>,
}

/// One evaluated assertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataQualityAssertion {
    /// Assertion name.
    #[serde(deserialize_with = "nullable")]
    pub assertion: String,
    /// Whether the assertion passed.
    #[serde(deserialize_with = "nullable")]
    pub success: bool,
    /// Column the assertion applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

/// Lifecycle state change facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleStateChangeFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Change kind, for example `OVERWRITE` or `RENAME`.
    #[serde(deserialize_with = "nullable", rename = "lifecycleStateChange")]
    pub lifecycle_state_change: String,
    /// Previous identity for renames.
    #[serde(rename = "previousIdentifier", skip_serializing_if = "Option::is_none")]
    pub previous_identifier: Option<DatasetIdentifier>,
}

/// Namespace/name pair identifying a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetIdentifier {
    /// Dataset namespace.
    #[serde(deserialize_with = "nullable")]
    pub namespace: String,
    /// Dataset name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Identifier kind, used by symlinks.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub identifier_type: Option<String>,
}

/// Symlinks facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymlinksFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Alternative identifiers.
    #[serde(deserialize_with = "nullable")]
    pub identifiers: Vec<DatasetIdentifier>,
}

// ============================================================================
// SECTION: Edge Facets
// ============================================================================

/// Typed view of input-only dataset facets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputDatasetFacets {
    /// Metrics measured on the consumed data.
    #[serde(
        rename = "dataQualityMetrics",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_quality_metrics: Option<DataQualityMetricsFacet>,
    /// Unrecognized facets, kept verbatim.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Data quality metrics facet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataQualityMetricsFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Number of rows.
    #[serde(rename = "rowCount", skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    /// Size in bytes.
    #[serde(alias = "size", skip_serializing_if = "Option::is_none")]
    pub bytes: Option<i64>,
    /// Per-column metrics keyed by column name.
    #[serde(rename = "columnMetrics", deserialize_with = "nullable")]
    pub column_metrics: BTreeMap<String, ColumnMetrics>,
}

/// Metrics for one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMetrics {
    /// Number of null values.
    #[serde(rename = "nullCount", skip_serializing_if = "Option::is_none")]
    pub null_count: Option<i64>,
    /// Number of distinct values.
    #[serde(rename = "distinctCount", skip_serializing_if = "Option::is_none")]
    pub distinct_count: Option<i64>,
    /// Sum of values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    /// Number of values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<f64>,
    /// Minimum value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Quantiles keyed by quantile label.
    #[serde(deserialize_with = "nullable", skip_serializing_if = "BTreeMap::is_empty")]
    pub quantiles: BTreeMap<String, f64>,
}

/// Typed view of output-only dataset facets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDatasetFacets {
    /// Statistics about the produced data.
    #[serde(
        rename = "outputStatistics",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub output_statistics: Option<OutputStatisticsFacet>,
    /// Unrecognized facets, kept verbatim.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Output statistics facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputStatisticsFacet {
    /// Provenance markers.
    #[serde(flatten)]
    pub meta: FacetMeta,
    /// Number of rows written.
    #[serde(deserialize_with = "nullable", rename = "rowCount")]
    pub row_count: i64,
    /// Bytes written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    /// Files written.
    #[serde(rename = "fileCount", skip_serializing_if = "Option::is_none")]
    pub file_count: Option<i64>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> FacetDocument {
        FacetDocument::from_value(value).unwrap()
    }

    #[test]
    fn decode_treats_empty_and_null_as_absent() {
        assert!(decode_facets(b"").unwrap().is_empty());
        assert!(decode_facets(b"  null ").unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_non_objects() {
        assert!(matches!(decode_facets(b"[1,2]"), Err(CatalogError::Serialization(_))));
        assert!(matches!(decode_facets(b"{not json"), Err(CatalogError::Serialization(_))));
    }

    #[test]
    fn encode_is_canonical() {
        let left = decode_facets(br#"{"b":1,"a":{"y":2,"x":1}}"#).unwrap();
        let right = decode_facets(br#"{"a":{"x":1,"y":2},"b":1}"#).unwrap();
        assert_eq!(left.encode(), right.encode());
        assert_eq!(left.encode(), br#"{"a":{"x":1,"y":2},"b":1}"#.to_vec());
    }

    #[test]
    fn merge_is_shallow_and_incoming_wins() {
        let existing = doc(json!({"a": {"x": 1, "y": 2}, "b": 1}));
        let incoming = doc(json!({"a": {"z": 3}, "c": true}));
        let merged = merge(&existing, &incoming);
        assert_eq!(merged, doc(json!({"a": {"z": 3}, "b": 1, "c": true})));
    }

    #[test]
    fn run_view_reads_nominal_time_and_error() {
        let facets = doc(json!({
            "nominalTime": {
                "nominalStartTime": "2020-12-17T03:00:00Z",
                "nominalEndTime": "2020-12-17T03:05:00Z"
            },
            "errorMessage": {"message": "Bang!", "programmingLanguage": "Go"},
            "custom": {"k": "v"}
        }));
        let view: RunFacets = facets.view().unwrap();
        let nominal = view.nominal_time.unwrap();
        assert_eq!(
            nominal.nominal_start_time.unwrap().to_rfc3339(),
            "2020-12-17T03:00:00Z"
        );
        assert_eq!(view.error_message.unwrap().message, "Bang!");
        assert_eq!(view.other.get("custom"), Some(&json!({"k": "v"})));
    }

    #[test]
    fn view_tolerates_missing_and_null_facets() {
        let facets = doc(json!({"parent": null, "schema": null}));
        let run: RunFacets = facets.view().unwrap();
        assert!(run.parent.is_none());
        assert!(run.parent_run_id().is_none());
        let dataset: DatasetFacets = facets.view().unwrap();
        assert!(dataset.schema_fields().is_none());
    }

    #[test]
    fn view_reads_null_leaf_values_as_defaults() {
        let job: JobFacets = doc(json!({"sql": {"query": null, "_producer": null}})).view().unwrap();
        let sql = job.sql.unwrap();
        assert_eq!(sql.query, "");
        assert_eq!(sql.meta.producer, "");

        let dataset: DatasetFacets = doc(json!({
            "schema": {"fields": [{"name": "x", "type": null}]},
            "dataQualityAssertions": {"assertions": [{"assertion": null, "success": null}]}
        }))
        .view()
        .unwrap();
        let fields = dataset.schema_fields().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "x");
        assert_eq!(fields[0].data_type, "");

        let output: OutputDatasetFacets =
            doc(json!({"outputStatistics": {"rowCount": null}})).view().unwrap();
        assert_eq!(output.output_statistics.unwrap().row_count, 0);
    }

    #[test]
    fn view_rejects_wrong_shapes() {
        let facets = doc(json!({"nominalTime": "soon"}));
        assert!(matches!(facets.view::<RunFacets>(), Err(CatalogError::Serialization(_))));
    }

    #[test]
    fn unknown_facets_survive_view_round_trip() {
        let facets = doc(json!({
            "sql": {"query": "select 1", "_producer": "p"},
            "vendor": {"anything": [1, 2, 3]}
        }));
        let view: JobFacets = facets.view().unwrap();
        let bytes = encode_view(&view).unwrap();
        let back = decode_facets(&bytes).unwrap();
        assert_eq!(back.get("vendor"), facets.get("vendor"));
        assert_eq!(back.get("sql"), facets.get("sql"));
    }

    #[test]
    fn schema_fields_keep_declared_order_and_duplicates() {
        let facets = doc(json!({"schema": {"fields": [
            {"name": "b", "type": "int"},
            {"name": "a", "type": "string"},
            {"name": "b", "type": "int"}
        ]}}));
        let view: DatasetFacets = facets.view().unwrap();
        let names: Vec<&str> =
            view.schema_fields().unwrap().iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
        let empty: DatasetFacets = doc(json!({"schema": {"fields": []}})).view().unwrap();
        assert_eq!(empty.schema_fields(), Some(&[][..]));
    }

    #[test]
    fn parent_run_id_accepts_legacy_id_key() {
        let facets = doc(json!({"parent": {"run": {"id": "abc"}, "job": {"name": "j"}}}));
        let view: RunFacets = facets.view().unwrap();
        assert_eq!(view.parent_run_id(), Some("abc"));
    }
}
