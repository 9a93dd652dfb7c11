/// Core data types for the river conditions service.
///
/// This module defines the shared domain model imported by all other modules:
/// telemetry samples, the per-source report every adapter returns, flow
/// thresholds and the canonical per-river record. Apart from a few
/// constructors it contains no logic and no I/O.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// USGS parameter code for discharge (streamflow), in cubic feet per second.
pub const PARAM_DISCHARGE: &str = "00060";

/// USGS parameter code for water temperature, in degrees Celsius.
pub const PARAM_WATER_TEMP: &str = "00010";

// ---------------------------------------------------------------------------
// Telemetry types
// ---------------------------------------------------------------------------

/// One timestamped observation from an upstream feed.
///
/// `value` is always finite; adapters drop anything that fails to parse
/// rather than storing a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub time: DateTime<FixedOffset>,
    pub value: f64,
}

impl Sample {
    pub fn new(time: DateTime<FixedOffset>, value: f64) -> Self {
        Self { time, value }
    }
}

/// Which upstream feed a station identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceKind {
    /// USGS NWIS instantaneous values (JSON).
    Usgs,
    /// NOAA Northwest River Forecast Center hydromet bulletin (XML).
    Nwrfc,
}

/// Outcome of a single adapter call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FetchStatus {
    /// Every requested parameter came back and no sample was dropped.
    Complete,
    /// The response parsed, but a requested parameter was missing or
    /// at least one sample was dropped.
    Partial,
    /// Nothing usable came back; the message says why.
    Failed(String),
}

/// Normalized output of one adapter call for one station.
///
/// This is the only shape the aggregation engine sees; source-specific
/// payload structure never leaves the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceReport {
    pub source: SourceKind,
    pub station: String,
    /// Discharge in cubic feet per second, chronological.
    pub discharge: Vec<Sample>,
    /// Water temperature already converted to Fahrenheit, chronological.
    pub temperature_f: Vec<Sample>,
    pub status: FetchStatus,
    /// When the adapter call finished. Breaks ties between sources that
    /// both report a temperature.
    pub fetched_at: DateTime<Utc>,
}

impl SourceReport {
    /// An empty report for a call that produced no data.
    pub fn failed(source: SourceKind, station: &str, reason: impl Into<String>) -> Self {
        Self {
            source,
            station: station.to_string(),
            discharge: Vec::new(),
            temperature_f: Vec::new(),
            status: FetchStatus::Failed(reason.into()),
            fetched_at: Utc::now(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, FetchStatus::Failed(_))
    }
}

// ---------------------------------------------------------------------------
// Threshold types
// ---------------------------------------------------------------------------

/// Flow-classification thresholds for a river, in cubic feet per second.
///
/// Levels in ascending order:
///   low < optimal_low <= optimal_high < high
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowThresholds {
    pub low: f64,
    pub optimal_low: f64,
    pub optimal_high: f64,
    pub high: f64,
}

impl FlowThresholds {
    /// True when the levels respect `low < optimal_low <= optimal_high < high`.
    pub fn is_well_ordered(&self) -> bool {
        self.low < self.optimal_low && self.optimal_low <= self.optimal_high && self.optimal_high < self.high
    }
}

/// How the current flow compares to a river's thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
    Low,
    Fair,
    Optimal,
    High,
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowStatus::Low => write!(f, "low"),
            FlowStatus::Fair => write!(f, "fair"),
            FlowStatus::Optimal => write!(f, "optimal"),
            FlowStatus::High => write!(f, "high"),
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical record
// ---------------------------------------------------------------------------

/// The aggregation engine's answer for one river and one request.
///
/// Optional fields are omitted from the serialized form when unavailable.
/// `flow_status` and `thresholds` are always present or absent together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiverRecord {
    #[serde(rename = "riverId")]
    pub river_id: String,
    #[serde(rename = "flowHistory")]
    pub flow_history: Vec<Sample>,
    #[serde(rename = "currentFlowCFS", skip_serializing_if = "Option::is_none")]
    pub current_flow_cfs: Option<f64>,
    #[serde(rename = "currentTempF", skip_serializing_if = "Option::is_none")]
    pub current_temp_f: Option<f64>,
    #[serde(rename = "flowStatus", skip_serializing_if = "Option::is_none")]
    pub flow_status: Option<FlowStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<FlowThresholds>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise inside an adapter while fetching or parsing a feed.
///
/// These never escape an adapter: `TelemetrySource::fetch` folds them into a
/// `FetchStatus::Failed` report.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Non-2xx HTTP response from the upstream service.
    #[error("HTTP error: {0}")]
    Http(u16),
    /// Connection failure, timeout, or body read failure.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The JSON body could not be deserialized.
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// The XML body could not be deserialized.
    #[error("Parse error: {0}")]
    Xml(#[from] quick_xml::DeError),
    /// The response parsed but held nothing usable for the station.
    #[error("No data available for station: {0}")]
    NoData(String),
}

/// Errors from the weather and fly-shop collaborators. Like `SourceError`,
/// these are absorbed at the collaborator's boundary into an "unavailable"
/// or "not found" value.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// A required credential is not configured.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
    /// No coordinates or other per-river data for this identifier.
    #[error("No data available for river: {0}")]
    UnknownRiver(String),
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}
