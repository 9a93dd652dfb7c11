/// Upstream telemetry adapters.
///
/// Each adapter turns one vendor payload into a `SourceReport`. The shared
/// helpers here implement the "parse or drop" rules both adapters follow:
/// a sample whose value or timestamp cannot be parsed is skipped, never
/// stored as a placeholder.
///
/// Submodules:
/// - `usgs`: USGS NWIS instantaneous values (JSON).
/// - `nwrfc`: NWRFC hydromet bulletin (XML).

pub mod nwrfc;
pub mod usgs;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use crate::config::ServiceConfig;
use crate::model::{SourceKind, SourceReport};
use crate::stations::StationFeed;

/// Common interface for every telemetry adapter.
///
/// `fetch` is infallible by contract: network, status, and parse failures
/// are caught inside the adapter and reported as `FetchStatus::Failed`.
pub trait TelemetrySource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Fetch and normalize one feed. Called with feeds whose
    /// `source()` matches `kind()`.
    fn fetch(&self, feed: &StationFeed) -> SourceReport;
}

/// Build the blocking HTTP client shared by all adapters.
pub fn http_client(config: &ServiceConfig) -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .build()
}

/// The adapters that back a default service instance.
pub fn default_sources(
    client: &reqwest::blocking::Client,
    config: &ServiceConfig,
) -> Vec<Box<dyn TelemetrySource>> {
    vec![
        Box::new(usgs::UsgsSource::new(client.clone(), &config.usgs_base_url)),
        Box::new(nwrfc::NwrfcSource::new(client.clone(), &config.nwrfc_base_url)),
    ]
}

/// Convert Celsius to whole degrees Fahrenheit.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    (celsius * 9.0 / 5.0 + 32.0).round()
}

/// Parse a numeric reading, rejecting anything non-finite.
pub fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an upstream timestamp.
///
/// Accepts RFC 3339 with an offset, or a naive `YYYY-MM-DDTHH:MM:SS` /
/// `YYYY-MM-DD HH:MM:SS` string taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Current time, stamped onto finished reports.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}
