// crates/lineage-catalog-core/src/core/event.rs
// ============================================================================
// Module: Lineage Event Model
// Description: Inbound run event wire format and its validated form.
// Purpose: Turn producer payloads into typed events before any mutation runs.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Producers post OpenLineage-style run events. Decoding happens in two
//! passes: the payload is parsed into a permissive wire struct, then
//! validated into a [`LineageEvent`] whose event type, time and run id are
//! already typed. Malformed JSON surfaces as
//! [`CatalogError::Serialization`]; well-formed JSON with bad values surfaces
//! as [`CatalogError::Validation`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::facets::FacetDocument;
use crate::core::facets::json_kind;
use crate::core::identifiers::ExternalRunId;
use crate::core::time::Timestamp;
use crate::interfaces::CatalogError;

// ============================================================================
// SECTION: Event Type
// ============================================================================

/// Kind of run transition an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Run started.
    Start,
    /// Run is still in progress.
    Running,
    /// Run finished successfully.
    Complete,
    /// Run was aborted.
    Abort,
    /// Run failed.
    Fail,
    /// Any other notification.
    Other,
}

impl EventType {
    /// All event types in persisted-code order.
    pub const ALL: [Self; 6] =
        [Self::Start, Self::Running, Self::Complete, Self::Abort, Self::Fail, Self::Other];

    /// Returns the stable persisted code (1-based).
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Start => 1,
            Self::Running => 2,
            Self::Complete => 3,
            Self::Abort => 4,
            Self::Fail => 5,
            Self::Other => 6,
        }
    }

    /// Maps a persisted code back to an event type.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Start),
            2 => Some(Self::Running),
            3 => Some(Self::Complete),
            4 => Some(Self::Abort),
            5 => Some(Self::Fail),
            6 => Some(Self::Other),
            _ => None,
        }
    }

    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Abort => "abort",
            Self::Fail => "fail",
            Self::Other => "other",
        }
    }

    /// Returns true for COMPLETE, the only type that closes a run and records edges.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CatalogError::Validation(format!("unknown event type {value:?}")))
    }
}

// ============================================================================
// SECTION: IO Type
// ============================================================================

/// Direction of a run/dataset edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoType {
    /// Dataset consumed by the run.
    Input,
    /// Dataset produced by the run.
    Output,
}

impl IoType {
    /// Returns the stable persisted code.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Input => 1,
            Self::Output => 2,
        }
    }

    /// Maps a persisted code back to a direction.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Input),
            2 => Some(Self::Output),
            _ => None,
        }
    }

    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Validated Event
// ============================================================================

/// Validated inbound run event.
///
/// # Invariants
/// - `job` and every dataset reference have non-empty namespace and name.
/// - Facet documents are JSON objects (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineageEvent {
    /// Reported transition.
    #[serde(rename = "eventType")]
    pub event_type: EventType,
    /// Producer-side time of the transition.
    #[serde(rename = "eventTime")]
    pub event_time: Timestamp,
    /// Run the event belongs to.
    pub run: RunRef,
    /// Job the run executes.
    pub job: JobRef,
    /// Datasets read by the run.
    pub inputs: Vec<DatasetRef>,
    /// Datasets written by the run.
    pub outputs: Vec<DatasetRef>,
    /// Producer URI.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub producer: String,
    /// Event schema URL.
    #[serde(rename = "schemaURL", skip_serializing_if = "String::is_empty")]
    pub schema_url: String,
}

/// Run section of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRef {
    /// External run id.
    #[serde(rename = "runId")]
    pub run_id: ExternalRunId,
    /// Run facets carried by this event only.
    pub facets: FacetDocument,
}

/// Job section of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRef {
    /// Job namespace name.
    pub namespace: String,
    /// Job name.
    pub name: String,
    /// Job facets.
    pub facets: FacetDocument,
}

/// Input or output dataset reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetRef {
    /// Dataset namespace name.
    pub namespace: String,
    /// Dataset name.
    pub name: String,
    /// Dataset-level facets.
    pub facets: FacetDocument,
    /// Direction-specific facets (`inputFacets` or `outputFacets`).
    #[serde(skip)]
    pub io_facets: FacetDocument,
    /// Direction of the reference.
    #[serde(skip)]
    pub io_type: IoType,
}

impl LineageEvent {
    /// Decodes and validates an event payload.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`] for malformed JSON or facets
    /// and [`CatalogError::Validation`] for missing or invalid values.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let wire: WireEvent = serde_json::from_slice(bytes)
            .map_err(|err| CatalogError::Serialization(format!("malformed run event: {err}")))?;
        Self::try_from(wire)
    }

    /// Re-encodes the event in its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`] when encoding fails.
    pub fn to_vec(&self) -> Result<Vec<u8>, CatalogError> {
        serde_json::to_vec(&WireEventOut::from(self))
            .map_err(|err| CatalogError::Serialization(format!("run event encode failed: {err}")))
    }

    /// Checks the name invariants of an event built in code.
    ///
    /// Decoded events already satisfy them.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] when the job or any dataset
    /// reference has an empty namespace or name.
    pub fn validate(&self) -> Result<(), CatalogError> {
        check_name(&self.job.namespace, "job.namespace")?;
        check_name(&self.job.name, "job.name")?;
        for (label, datasets) in [("inputs", &self.inputs), ("outputs", &self.outputs)] {
            for (index, dataset) in datasets.iter().enumerate() {
                check_name(&dataset.namespace, &format!("{label}[{index}].namespace"))?;
                check_name(&dataset.name, &format!("{label}[{index}].name"))?;
            }
        }
        Ok(())
    }

    /// Returns every dataset reference, inputs first.
    pub fn datasets(&self) -> impl Iterator<Item = &DatasetRef> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Returns the number of dataset references.
    #[must_use]
    pub fn dataset_count(&self) -> usize {
        self.inputs.len() + self.outputs.len()
    }
}

// ============================================================================
// SECTION: Wire Format
// ============================================================================

/// Permissive wire form of an inbound event.
#[derive(Debug, Deserialize)]
struct WireEvent {
    /// Raw event type label.
    #[serde(rename = "eventType", default)]
    event_type: Option<Value>,
    /// Raw event time.
    #[serde(rename = "eventTime", default)]
    event_time: Option<Value>,
    /// Run section.
    #[serde(default)]
    run: Option<WireRun>,
    /// Job section.
    #[serde(default)]
    job: Option<WireJob>,
    /// Input datasets.
    #[serde(default)]
    inputs: Option<Vec<WireDataset>>,
    /// Output datasets.
    #[serde(default)]
    outputs: Option<Vec<WireDataset>>,
    /// Producer URI.
    #[serde(default)]
    producer: Option<Value>,
    /// Event schema URL.
    #[serde(rename = "schemaURL", default)]
    schema_url: Option<Value>,
}

/// Wire form of the run section.
#[derive(Debug, Deserialize)]
struct WireRun {
    /// Raw run id.
    #[serde(rename = "runId", alias = "id", default)]
    run_id: Option<Value>,
    /// Raw run facets.
    #[serde(default)]
    facets: Value,
}

/// Wire form of the job section.
#[derive(Debug, Deserialize)]
struct WireJob {
    /// Job namespace.
    #[serde(default)]
    namespace: Option<Value>,
    /// Job name.
    #[serde(default)]
    name: Option<Value>,
    /// Raw job facets.
    #[serde(default)]
    facets: Value,
}

/// Wire form of a dataset reference.
#[derive(Debug, Deserialize)]
struct WireDataset {
    /// Dataset namespace.
    #[serde(default)]
    namespace: Option<Value>,
    /// Dataset name.
    #[serde(default)]
    name: Option<Value>,
    /// Raw dataset facets.
    #[serde(default)]
    facets: Value,
    /// Raw input facets.
    #[serde(rename = "inputFacets", default)]
    input_facets: Value,
    /// Raw output facets.
    #[serde(rename = "outputFacets", default)]
    output_facets: Value,
}

impl TryFrom<WireEvent> for LineageEvent {
    type Error = CatalogError;

    fn try_from(wire: WireEvent) -> Result<Self, Self::Error> {
        let event_type = optional_text(wire.event_type, "eventType")?
            .ok_or_else(|| CatalogError::Validation("eventType is required".to_string()))?
            .parse::<EventType>()?;
        let event_time = optional_text(wire.event_time, "eventTime")?
            .ok_or_else(|| CatalogError::Validation("eventTime is required".to_string()))
            .and_then(|value| Timestamp::parse_rfc3339(&value))?;
        let run = wire
            .run
            .ok_or_else(|| CatalogError::Validation("run is required".to_string()))?;
        let run_id = optional_text(run.run_id, "run.runId")?
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| CatalogError::Validation("run.runId is required".to_string()))
            .and_then(|value| ExternalRunId::parse(&value))?;
        let job = wire
            .job
            .ok_or_else(|| CatalogError::Validation("job is required".to_string()))?;
        let job = JobRef {
            namespace: required_name(job.namespace, "job.namespace")?,
            name: required_name(job.name, "job.name")?,
            facets: FacetDocument::from_value(job.facets)?,
        };
        let inputs = convert_datasets(wire.inputs.unwrap_or_default(), IoType::Input)?;
        let outputs = convert_datasets(wire.outputs.unwrap_or_default(), IoType::Output)?;
        Ok(Self {
            event_type,
            event_time,
            run: RunRef {
                run_id,
                facets: FacetDocument::from_value(run.facets)?,
            },
            job,
            inputs,
            outputs,
            producer: optional_text(wire.producer, "producer")?.unwrap_or_default(),
            schema_url: optional_text(wire.schema_url, "schemaURL")?.unwrap_or_default(),
        })
    }
}

/// Validates and converts a list of wire dataset references.
fn convert_datasets(
    datasets: Vec<WireDataset>,
    io_type: IoType,
) -> Result<Vec<DatasetRef>, CatalogError> {
    datasets
        .into_iter()
        .enumerate()
        .map(|(index, dataset)| {
            let label = format!("{}s[{index}]", io_type.as_str());
            let io_facets = match io_type {
                IoType::Input => dataset.input_facets,
                IoType::Output => dataset.output_facets,
            };
            Ok(DatasetRef {
                namespace: required_name(dataset.namespace, &format!("{label}.namespace"))?,
                name: required_name(dataset.name, &format!("{label}.name"))?,
                facets: FacetDocument::from_value(dataset.facets)?,
                io_facets: FacetDocument::from_value(io_facets)?,
                io_type,
            })
        })
        .collect()
}

/// Returns the string held by an optional wire value.
///
/// An absent value and JSON `null` both yield `None`; any other non-string
/// value is a validation error.
fn optional_text(value: Option<Value>, field: &str) -> Result<Option<String>, CatalogError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(other) => Err(CatalogError::Validation(format!(
            "{field} must be a string, found {}",
            json_kind(&other)
        ))),
    }
}

/// Returns a non-empty name from a wire value or a validation error.
fn required_name(value: Option<Value>, field: &str) -> Result<String, CatalogError> {
    let name = optional_text(value, field)?.unwrap_or_default();
    check_name(&name, field)?;
    Ok(name)
}

/// Rejects names that are empty after trimming.
fn check_name(name: &str, field: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation(format!("{field} must be a non-empty string")));
    }
    Ok(())
}

/// Outbound wire form used when re-encoding a typed event.
#[derive(Serialize)]
struct WireEventOut<'a> {
    /// Event type label.
    #[serde(rename = "eventType")]
    event_type: &'a str,
    /// Event time.
    #[serde(rename = "eventTime")]
    event_time: Timestamp,
    /// Run section.
    run: &'a RunRef,
    /// Job section.
    job: &'a JobRef,
    /// Inputs with `inputFacets`.
    inputs: Vec<WireDatasetOut<'a>>,
    /// Outputs with `outputFacets`.
    outputs: Vec<WireDatasetOut<'a>>,
    /// Producer URI.
    #[serde(skip_serializing_if = "str::is_empty")]
    producer: &'a str,
    /// Event schema URL.
    #[serde(rename = "schemaURL", skip_serializing_if = "str::is_empty")]
    schema_url: &'a str,
}

/// Outbound wire form of a dataset reference.
#[derive(Serialize)]
struct WireDatasetOut<'a> {
    /// Dataset namespace.
    namespace: &'a str,
    /// Dataset name.
    name: &'a str,
    /// Dataset facets.
    facets: &'a FacetDocument,
    /// Input facets, for inputs only.
    #[serde(rename = "inputFacets", skip_serializing_if = "Option::is_none")]
    input_facets: Option<&'a FacetDocument>,
    /// Output facets, for outputs only.
    #[serde(rename = "outputFacets", skip_serializing_if = "Option::is_none")]
    output_facets: Option<&'a FacetDocument>,
}

impl<'a> From<&'a DatasetRef> for WireDatasetOut<'a> {
    fn from(dataset: &'a DatasetRef) -> Self {
        let (input_facets, output_facets) = match dataset.io_type {
            IoType::Input => (Some(&dataset.io_facets), None),
            IoType::Output => (None, Some(&dataset.io_facets)),
        };
        Self {
            namespace: &dataset.namespace,
            name: &dataset.name,
            facets: &dataset.facets,
            input_facets,
            output_facets,
        }
    }
}

impl<'a> From<&'a LineageEvent> for WireEventOut<'a> {
    fn from(event: &'a LineageEvent) -> Self {
        Self {
            event_type: event.event_type.as_str(),
            event_time: event.event_time,
            run: &event.run,
            job: &event.job,
            inputs: event.inputs.iter().map(WireDatasetOut::from).collect(),
            outputs: event.outputs.iter().map(WireDatasetOut::from).collect(),
            producer: &event.producer,
            schema_url: &event.schema_url,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use serde_json::json;

    use super::*;

    fn payload(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    fn minimal() -> Value {
        json!({
            "eventType": "START",
            "eventTime": "2020-12-17T03:00:00Z",
            "run": {"runId": "3f5e83fa-3480-44ff-99c5-ff943904e5e8"},
            "job": {"namespace": "etl", "name": "daily"},
            "producer": "https://example.com/producer"
        })
    }

    #[test]
    fn event_type_parsing_is_case_insensitive() {
        assert_eq!("COMPLETE".parse::<EventType>().unwrap(), EventType::Complete);
        assert_eq!("Running".parse::<EventType>().unwrap(), EventType::Running);
        assert!(matches!("resume".parse::<EventType>(), Err(CatalogError::Validation(_))));
    }

    #[test]
    fn event_type_codes_round_trip() {
        for event_type in EventType::ALL {
            assert_eq!(EventType::from_code(event_type.code()), Some(event_type));
        }
        assert_eq!(EventType::from_code(0), None);
    }

    #[test]
    fn minimal_event_decodes_with_empty_facets() {
        let event = LineageEvent::from_slice(&payload(&minimal())).unwrap();
        assert_eq!(event.event_type, EventType::Start);
        assert!(event.run.facets.is_empty());
        assert!(event.inputs.is_empty());
        assert_eq!(event.producer, "https://example.com/producer");
    }

    #[test]
    fn missing_run_id_is_a_validation_error() {
        let mut value = minimal();
        value["run"] = json!({"facets": {}});
        let err = LineageEvent::from_slice(&payload(&value)).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn non_uuid_run_id_is_a_validation_error() {
        let mut value = minimal();
        value["run"]["runId"] = json!("run-42");
        let err = LineageEvent::from_slice(&payload(&value)).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn numeric_event_type_is_a_validation_error() {
        let mut value = minimal();
        value["eventType"] = json!(3);
        let err = LineageEvent::from_slice(&payload(&value)).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(message) if message.contains("eventType")));
    }

    #[test]
    fn numeric_run_id_is_a_validation_error() {
        let mut value = minimal();
        value["run"]["runId"] = json!(12345);
        let err = LineageEvent::from_slice(&payload(&value)).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(message) if message.contains("run.runId")));
    }

    #[test]
    fn non_string_names_and_times_are_validation_errors() {
        for (pointer, replacement) in [
            ("/eventTime", json!(1_608_174_000)),
            ("/job/namespace", json!(["etl"])),
            ("/producer", json!(false)),
        ] {
            let mut value = minimal();
            *value.pointer_mut(pointer).unwrap() = replacement;
            let err = LineageEvent::from_slice(&payload(&value)).unwrap_err();
            assert!(matches!(err, CatalogError::Validation(_)), "{pointer}: {err}");
        }
    }

    #[test]
    fn null_producer_is_treated_as_absent() {
        let mut value = minimal();
        value["producer"] = Value::Null;
        let event = LineageEvent::from_slice(&payload(&value)).unwrap();
        assert_eq!(event.producer, "");
    }

    #[test]
    fn validate_rejects_empty_names_on_built_events() {
        let decoded = LineageEvent::from_slice(&payload(&minimal())).unwrap();
        decoded.validate().unwrap();

        let mut event = decoded.clone();
        event.job.namespace = String::new();
        let err = event.validate().unwrap_err();
        assert!(matches!(err, CatalogError::Validation(message) if message.contains("job.namespace")));

        let mut event = decoded;
        event.outputs.push(DatasetRef {
            namespace: "warehouse".to_string(),
            name: "  ".to_string(),
            facets: FacetDocument::new(),
            io_facets: FacetDocument::new(),
            io_type: IoType::Output,
        });
        let err = event.validate().unwrap_err();
        assert!(matches!(err, CatalogError::Validation(message) if message.contains("outputs[0].name")));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = LineageEvent::from_slice(b"{\"eventType\":").unwrap_err();
        assert!(matches!(err, CatalogError::Serialization(_)));
    }

    #[test]
    fn non_object_facets_are_a_serialization_error() {
        let mut value = minimal();
        value["job"]["facets"] = json!([1, 2, 3]);
        let err = LineageEvent::from_slice(&payload(&value)).unwrap_err();
        assert!(matches!(err, CatalogError::Serialization(_)));
    }

    #[test]
    fn dataset_names_are_required() {
        let mut value = minimal();
        value["outputs"] = json!([{"namespace": "warehouse", "name": " "}]);
        let err = LineageEvent::from_slice(&payload(&value)).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(message) if message.contains("outputs[0]")));
    }

    #[test]
    fn io_facets_follow_direction() {
        let mut value = minimal();
        value["inputs"] = json!([{
            "namespace": "warehouse", "name": "src",
            "inputFacets": {"dataQualityMetrics": {"rowCount": 10}},
            "outputFacets": {"ignored": true}
        }]);
        let event = LineageEvent::from_slice(&payload(&value)).unwrap();
        let input = &event.inputs[0];
        assert_eq!(input.io_type, IoType::Input);
        assert!(input.io_facets.get("dataQualityMetrics").is_some());
        assert!(input.io_facets.get("ignored").is_none());
    }

    #[test]
    fn re_encoded_event_decodes_to_the_same_event() {
        let mut value = minimal();
        value["outputs"] = json!([{
            "namespace": "warehouse", "name": "dst",
            "facets": {"schema": {"fields": [{"name": "a", "type": "int"}]}},
            "outputFacets": {"outputStatistics": {"rowCount": 3}}
        }]);
        let event = LineageEvent::from_slice(&payload(&value)).unwrap();
        let again = LineageEvent::from_slice(&event.to_vec().unwrap()).unwrap();
        assert_eq!(event, again);
    }
}
