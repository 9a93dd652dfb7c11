/// Structured logging for the river conditions service
///
/// Sets up `tracing` output (stderr plus an optional log file) and provides
/// helpers that tag upstream failures with their data source, station, and
/// a rough classification of whether the failure was expected.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::model::SourceKind;

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Usgs,
    Nwrfc,
    OpenWeather,
    FlyShop,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Usgs => write!(f, "USGS"),
            DataSource::Nwrfc => write!(f, "NWRFC"),
            DataSource::OpenWeather => write!(f, "OWM"),
            DataSource::FlyShop => write!(f, "SHOP"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

impl From<SourceKind> for DataSource {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Usgs => DataSource::Usgs,
            SourceKind::Nwrfc => DataSource::Nwrfc,
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - station offline, seasonal, or simply not reporting
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify an upstream failure from its error message.
pub fn classify_failure(source: DataSource, error_message: &str) -> FailureType {
    if error_message.contains("No data available") {
        // Gauges drop out for maintenance and ice; not worth an error.
        FailureType::Expected
    } else if error_message.contains("Missing credential") {
        FailureType::Expected
    } else if error_message.contains("HTTP error")
        || error_message.contains("Request failed")
        || error_message.contains("timed out")
    {
        FailureType::Unexpected
    } else if error_message.contains("Parse error") {
        // The shop report is scraped HTML; layout changes are routine.
        if source == DataSource::FlyShop {
            FailureType::Unknown
        } else {
            FailureType::Unexpected
        }
    } else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

/// Initialize the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. When `log_file` is
/// given, output goes to that file (appended, no ANSI colours) instead of
/// stderr. Calling this twice is harmless; the second call is ignored.
pub fn init_logging(default_filter: &str, log_file: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let file = log_file.and_then(|path| match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path, e);
            None
        }
    });

    let _ = match file {
        Some(f) => builder.with_ansi(false).with_writer(Mutex::new(f)).try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a data source failure with automatic classification
pub fn log_source_failure(source: DataSource, station: &str, operation: &str, error_message: &str) {
    let failure_type = classify_failure(source, error_message);
    let source_name = source.to_string();

    match failure_type {
        FailureType::Expected => debug!(source = %source_name, station, "{} failed [{}]: {}", operation, failure_type, error_message),
        FailureType::Unexpected => error!(source = %source_name, station, "{} failed [{}]: {}", operation, failure_type, error_message),
        FailureType::Unknown => warn!(source = %source_name, station, "{} failed [{}]: {}", operation, failure_type, error_message),
    }
}

/// Log a summary of one river's aggregation
pub fn log_aggregation_summary(river_id: &str, total: usize, successful: usize, failed: usize) {
    if failed == 0 {
        info!(river = river_id, "Aggregation complete: {}/{} feeds successful", successful, total);
    } else if successful == 0 && total > 0 {
        error!(river = river_id, "Aggregation complete: {}/{} feeds successful, {} failed", successful, total, failed);
    } else {
        warn!(river = river_id, "Aggregation complete: {}/{} feeds successful, {} failed", successful, total, failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classification() {
        let no_data = "No data available for station: 14164900";
        assert_eq!(classify_failure(DataSource::Usgs, no_data), FailureType::Expected);

        assert_eq!(classify_failure(DataSource::Usgs, "HTTP error: 500"), FailureType::Unexpected);
        assert_eq!(classify_failure(DataSource::Nwrfc, "Parse error: bad xml"), FailureType::Unexpected);
        assert_eq!(classify_failure(DataSource::FlyShop, "Parse error: selector"), FailureType::Unknown);
        assert_eq!(classify_failure(DataSource::System, "something odd"), FailureType::Unknown);
    }

    #[test]
    fn test_source_kind_maps_to_data_source() {
        assert_eq!(DataSource::from(SourceKind::Usgs), DataSource::Usgs);
        assert_eq!(DataSource::from(SourceKind::Nwrfc).to_string(), "NWRFC");
    }

    #[test]
    fn test_logging_without_subscriber_is_a_no_op() {
        log_source_failure(DataSource::Usgs, "14164900", "fetch", "HTTP error: 503");
        log_aggregation_summary("mckenzie_hayden", 1, 0, 1);
    }
}
