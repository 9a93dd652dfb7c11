/// USGS NWIS Instantaneous Values (IV) client
///
/// Retrieves discharge and water temperature from the USGS Water Services
/// JSON API and normalizes them into `SourceReport`s.
///
/// API Documentation: https://waterservices.usgs.gov/docs/instantaneous-values/
///
/// Response shape (trimmed):
///   value.timeSeries[] {
///     variable { variableCode[0].value, noDataValue }
///     values[0].value[] { value: "1530", dateTime: "2024-05-01T12:00:00.000-07:00" }
///   }

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{TelemetrySource, celsius_to_fahrenheit, parse_timestamp, parse_value};
use crate::logging::{DataSource, log_source_failure};
use crate::model::{FetchStatus, PARAM_DISCHARGE, PARAM_WATER_TEMP, Sample, SourceError, SourceKind, SourceReport};
use crate::stations::StationFeed;

// ============================================================================
// IV API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IvResponse {
    pub value: IvValue,
}

#[derive(Debug, Deserialize)]
pub struct IvValue {
    #[serde(rename = "timeSeries", default)]
    pub time_series: Vec<IvTimeSeries>,
}

#[derive(Debug, Deserialize)]
pub struct IvTimeSeries {
    pub variable: IvVariable,
    #[serde(default)]
    pub values: Vec<IvValueBlock>,
}

#[derive(Debug, Deserialize)]
pub struct IvVariable {
    #[serde(rename = "variableCode", default)]
    pub variable_code: Vec<IvCode>,
    #[serde(rename = "noDataValue", default)]
    pub no_data_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct IvCode {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct IvValueBlock {
    #[serde(default)]
    pub value: Vec<IvPoint>,
}

/// One `{value, dateTime}` pair. Both fields are kept as raw JSON so a
/// single malformed point is dropped instead of failing the whole response.
#[derive(Debug, Deserialize)]
pub struct IvPoint {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(rename = "dateTime", default)]
    pub date_time: Option<Value>,
}

impl IvPoint {
    /// The reading as a finite number. The service sends strings, but a
    /// bare JSON number is accepted too.
    pub fn as_number(&self) -> Option<f64> {
        match self.value.as_ref()? {
            Value::String(raw) => parse_value(raw),
            Value::Number(n) => parse_value(&n.to_string()),
            _ => None,
        }
    }
}

/// Samples for one parameter code, after dropping malformed points.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSeries {
    pub parameter_code: String,
    /// Chronological.
    pub samples: Vec<Sample>,
    /// Points skipped for a bad value, bad timestamp, or the no-data sentinel.
    pub dropped: usize,
}

// ============================================================================
// URL Construction
// ============================================================================

/// Build an IV request URL.
///
/// `period` is an ISO 8601 duration such as `"P2D"`; `None` asks the service
/// for the most recent value only.
pub fn build_iv_url(base_url: &str, sites: &[&str], parameters: &[&str], period: Option<&str>) -> String {
    let mut url = format!(
        "{}?format=json&sites={}&parameterCd={}&siteStatus=all",
        base_url,
        sites.join(","),
        parameters.join(",")
    );
    if let Some(p) = period {
        url.push_str("&period=");
        url.push_str(p);
    }
    url
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse an IV JSON body into one `ParsedSeries` per parameter code.
///
/// Only the first series and first method block for each code is used,
/// which is what the service returns for a single-sensor site.
pub fn parse_iv_response(body: &str) -> Result<Vec<ParsedSeries>, SourceError> {
    let response: IvResponse = serde_json::from_str(body)?;
    let mut parsed: Vec<ParsedSeries> = Vec::new();

    for series in response.value.time_series {
        let Some(code) = series.variable.variable_code.first().map(|c| c.value.clone()) else {
            continue;
        };
        if parsed.iter().any(|p| p.parameter_code == code) {
            continue;
        }

        let no_data = series.variable.no_data_value;
        let points = series.values.into_iter().next().map(|b| b.value).unwrap_or_default();
        let total = points.len();

        let mut samples: Vec<Sample> = points
            .iter()
            .filter_map(|p| parse_point(p, no_data))
            .collect();
        samples.sort_by_key(|s| s.time);

        parsed.push(ParsedSeries {
            parameter_code: code,
            dropped: total - samples.len(),
            samples,
        });
    }

    Ok(parsed)
}

fn parse_point(point: &IvPoint, no_data: Option<f64>) -> Option<Sample> {
    let value = point.as_number()?;
    if no_data.is_some_and(|sentinel| value == sentinel) {
        return None;
    }
    let time = parse_timestamp(point.date_time.as_ref()?.as_str()?)?;
    Some(Sample::new(time, value))
}

/// Samples for `code`, or an empty list when the response has no such series.
pub fn samples_for(series: &[ParsedSeries], code: &str) -> Vec<Sample> {
    series
        .iter()
        .find(|s| s.parameter_code == code)
        .map(|s| s.samples.clone())
        .unwrap_or_default()
}

/// Turn parsed series into a report for one site.
///
/// Discharge passes through unchanged; temperature is converted to
/// whole degrees Fahrenheit. A requested code with no series yields an
/// empty list and marks the report `Partial`.
pub fn build_report(site_code: &str, requested: &[&str], series: &[ParsedSeries]) -> SourceReport {
    let discharge = if requested.contains(&PARAM_DISCHARGE) {
        samples_for(series, PARAM_DISCHARGE)
    } else {
        Vec::new()
    };
    let temperature_f: Vec<Sample> = if requested.contains(&PARAM_WATER_TEMP) {
        samples_for(series, PARAM_WATER_TEMP)
            .into_iter()
            .map(|s| Sample::new(s.time, celsius_to_fahrenheit(s.value)))
            .collect()
    } else {
        Vec::new()
    };

    let missing = requested.iter().any(|code| samples_for(series, code).is_empty());
    let dropped = series
        .iter()
        .filter(|s| requested.contains(&s.parameter_code.as_str()))
        .any(|s| s.dropped > 0);

    SourceReport {
        source: SourceKind::Usgs,
        station: site_code.to_string(),
        discharge,
        temperature_f,
        status: if missing || dropped { FetchStatus::Partial } else { FetchStatus::Complete },
        fetched_at: super::now(),
    }
}

// ============================================================================
// API Client
// ============================================================================

/// JSON telemetry adapter backed by the USGS IV service.
pub struct UsgsSource {
    client: Client,
    base_url: String,
}

impl UsgsSource {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    fn try_fetch(&self, site_code: &str, parameters: &[&str], period: Option<&str>) -> Result<SourceReport, SourceError> {
        let url = build_iv_url(&self.base_url, &[site_code], parameters, period);
        tracing::debug!(station = site_code, %url, "requesting USGS IV data");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()?;
        if !response.status().is_success() {
            return Err(SourceError::Http(response.status().as_u16()));
        }

        let body = response.text()?;
        let series = parse_iv_response(&body)?;
        Ok(build_report(site_code, parameters, &series))
    }
}

impl TelemetrySource for UsgsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Usgs
    }

    fn fetch(&self, feed: &StationFeed) -> SourceReport {
        let StationFeed::Usgs { site_code, parameters, period } = *feed else {
            return SourceReport::failed(SourceKind::Usgs, feed.station_id(), "feed is not a USGS station");
        };

        match self.try_fetch(site_code, parameters, period) {
            Ok(report) => report,
            Err(e) => {
                let message = e.to_string();
                log_source_failure(DataSource::Usgs, site_code, "fetch_iv", &message);
                SourceReport::failed(SourceKind::Usgs, site_code, message)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
