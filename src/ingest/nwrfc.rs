/// NOAA Northwest River Forecast Center (NWRFC) hydromet XML client
///
/// Some rivers have no USGS discharge gauge near the fishing water; the
/// NWRFC bulletin for the co-located NWS forecast point fills that gap.
///
/// Endpoint: https://www.nwrfc.noaa.gov/xml/xml.cgi?id=EUGO3&pe=HG&dtype=b&numdays=2
///
/// Document shape (trimmed):
/// ```text
/// <HydroMetData>
///   <SiteData>
///     <observedData>
///       <observedValue>
///         <dataDateTime>2024-05-01T12:00:00-07:00</dataDateTime>
///         <discharge units="kcfs">4120</discharge>
///       </observedValue>
/// ```
/// `discharge` shows up both as a bare element and as an element carrying
/// attributes; either way the element text is the reading.

use reqwest::blocking::Client;
use serde::Deserialize;

use super::{TelemetrySource, parse_timestamp, parse_value};
use crate::logging::{DataSource, log_source_failure};
use crate::model::{FetchStatus, Sample, SourceError, SourceKind, SourceReport};
use crate::stations::StationFeed;

// ============================================================================
// Bulletin Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HydroMetData {
    #[serde(rename = "SiteData", default)]
    pub site_data: Vec<SiteData>,
}

#[derive(Debug, Deserialize)]
pub struct SiteData {
    #[serde(rename = "observedData", default)]
    pub observed_data: Vec<ObservedData>,
}

#[derive(Debug, Deserialize)]
pub struct ObservedData {
    #[serde(rename = "observedValue", default)]
    pub observed_value: Vec<ObservedValue>,
}

#[derive(Debug, Deserialize)]
pub struct ObservedValue {
    #[serde(rename = "dataDateTime", default)]
    pub data_date_time: Option<String>,
    /// Normally one element; when a bulletin repeats it, the first
    /// parseable reading wins.
    #[serde(default)]
    pub discharge: Vec<DischargeValue>,
}

/// A `<discharge>` element, with or without attributes. Attributes such as
/// `units` or `qualifier` are ignored.
#[derive(Debug, Deserialize)]
pub struct DischargeValue {
    #[serde(rename = "$text", default)]
    pub text: Option<String>,
}

impl DischargeValue {
    /// The reading as a finite number, if it is one.
    pub fn as_number(&self) -> Option<f64> {
        parse_value(self.text.as_deref()?)
    }
}

/// Observations kept from one bulletin.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBulletin {
    /// Chronological, rounded to whole cfs.
    pub samples: Vec<Sample>,
    /// Observations skipped for a missing or unparseable field.
    pub dropped: usize,
}

// ============================================================================
// URL Construction
// ============================================================================

pub fn build_bulletin_url(base_url: &str, station_id: &str, physical_element: &str, days: u32) -> String {
    format!(
        "{}?id={}&pe={}&dtype=b&numdays={}",
        base_url, station_id, physical_element, days
    )
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a hydromet bulletin into discharge samples.
///
/// Reads `SiteData[0]/observedData[0]/observedValue[*]`. Observations with
/// a missing timestamp or a discharge that is not a finite number are
/// dropped; the rest are rounded to whole units and sorted.
pub fn parse_hydromet_response(body: &str) -> Result<ParsedBulletin, SourceError> {
    let doc: HydroMetData = quick_xml::de::from_str(body)?;

    let observations = doc
        .site_data
        .into_iter()
        .next()
        .and_then(|site| site.observed_data.into_iter().next())
        .map(|data| data.observed_value)
        .unwrap_or_default();
    let total = observations.len();

    let mut samples: Vec<Sample> = observations.iter().filter_map(parse_observation).collect();
    samples.sort_by_key(|s| s.time);

    Ok(ParsedBulletin {
        dropped: total - samples.len(),
        samples,
    })
}

fn parse_observation(obs: &ObservedValue) -> Option<Sample> {
    let time = parse_timestamp(obs.data_date_time.as_deref()?)?;
    let value = obs.discharge.iter().find_map(DischargeValue::as_number)?;
    Some(Sample::new(time, value.round()))
}

// ============================================================================
// API Client
// ============================================================================

/// XML telemetry adapter backed by the NWRFC bulletin service.
pub struct NwrfcSource {
    client: Client,
    base_url: String,
}

impl NwrfcSource {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    fn try_fetch(&self, station_id: &str, physical_element: &str, days: u32) -> Result<SourceReport, SourceError> {
        let url = build_bulletin_url(&self.base_url, station_id, physical_element, days);
        tracing::debug!(station = station_id, %url, "requesting NWRFC bulletin");

        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(SourceError::Http(response.status().as_u16()));
        }

        let body = response.text()?;
        let bulletin = parse_hydromet_response(&body)?;
        if bulletin.samples.is_empty() {
            return Err(SourceError::NoData(station_id.to_string()));
        }
        tracing::debug!(
            station = station_id,
            kept = bulletin.samples.len(),
            dropped = bulletin.dropped,
            "parsed NWRFC bulletin"
        );

        Ok(SourceReport {
            source: SourceKind::Nwrfc,
            station: station_id.to_string(),
            status: if bulletin.dropped > 0 { FetchStatus::Partial } else { FetchStatus::Complete },
            discharge: bulletin.samples,
            temperature_f: Vec::new(),
            fetched_at: super::now(),
        })
    }
}

impl TelemetrySource for NwrfcSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Nwrfc
    }

    fn fetch(&self, feed: &StationFeed) -> SourceReport {
        let StationFeed::Nwrfc { station_id, physical_element, days } = *feed else {
            return SourceReport::failed(SourceKind::Nwrfc, feed.station_id(), "feed is not an NWRFC station");
        };

        match self.try_fetch(station_id, physical_element, days) {
            Ok(report) => report,
            Err(e) => {
                let message = e.to_string();
                log_source_failure(DataSource::Nwrfc, station_id, "fetch_bulletin", &message);
                SourceReport::failed(SourceKind::Nwrfc, station_id, message)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EUGENE_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<HydroMetData>
  <SiteData>
    <observedData>
      <observedValue>
        <dataDateTime>2024-05-01T13:00:00-07:00</dataDateTime>
        <stage units="feet">4.21</stage>
        <discharge units="cfs" other_attr="x">812.5</discharge>
      </observedValue>
      <observedValue>
        <dataDateTime>2024-05-01T12:00:00-07:00</dataDateTime>
        <stage>4.20</stage>
        <discharge>804</discharge>
      </observedValue>
      <observedValue>
        <dataDateTime>2024-05-01T14:00:00-07:00</dataDateTime>
        <discharge>M</discharge>
      </observedValue>
      <observedValue>
        <discharge>900</discharge>
      </observedValue>
    </observedData>
  </SiteData>
</HydroMetData>"#;

    #[test]
    fn test_bulletin_url() {
        assert_eq!(
            build_bulletin_url("https://example.test/xml.cgi", "EUGO3", "HG", 2),
            "https://example.test/xml.cgi?id=EUGO3&pe=HG&dtype=b&numdays=2"
        );
    }

    #[test]
    fn test_wrapped_and_bare_discharge_both_parse() {
        let bulletin = parse_hydromet_response(EUGENE_FIXTURE).unwrap();

        assert_eq!(bulletin.samples.len(), 2);
        assert_eq!(bulletin.samples[0].value, 804.0);
        // Attribute-carrying element, rounded half away from zero.
        assert_eq!(bulletin.samples[1].value, 813.0);
    }

    #[test]
    fn test_unparseable_and_incomplete_observations_are_dropped() {
        let bulletin = parse_hydromet_response(EUGENE_FIXTURE).unwrap();
        assert_eq!(bulletin.dropped, 2);
        assert!(bulletin.samples.iter().all(|s| s.value.is_finite()));
    }

    #[test]
    fn test_missing_site_data_yields_no_samples() {
        let bulletin = parse_hydromet_response("<HydroMetData></HydroMetData>").unwrap();
        assert!(bulletin.samples.is_empty());
        assert_eq!(bulletin.dropped, 0);
    }

    #[test]
    fn test_repeated_discharge_keeps_first_parseable_reading() {
        let xml = r#"<HydroMetData><SiteData><observedData>
            <observedValue>
              <dataDateTime>2024-05-01T12:00:00-07:00</dataDateTime>
              <discharge>804</discharge>
            </observedValue>
            <observedValue>
              <dataDateTime>2024-05-01T13:00:00-07:00</dataDateTime>
              <discharge>M</discharge>
              <stage>4.21</stage>
              <discharge units="cfs">812.5</discharge>
            </observedValue>
            <observedValue>
              <dataDateTime>2024-05-01T14:00:00-07:00</dataDateTime>
              <discharge>820</discharge>
              <discharge>999</discharge>
            </observedValue>
        </observedData></SiteData></HydroMetData>"#;
        let bulletin = parse_hydromet_response(xml).unwrap();

        let values: Vec<f64> = bulletin.samples.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![804.0, 813.0, 820.0]);
        assert_eq!(bulletin.dropped, 0);
    }

    #[test]
    fn test_empty_discharge_element_is_dropped() {
        let xml = r#"<HydroMetData><SiteData><observedData>
            <observedValue><dataDateTime>2024-05-01T12:00:00-07:00</dataDateTime><discharge/></observedValue>
        </observedData></SiteData></HydroMetData>"#;
        let bulletin = parse_hydromet_response(xml).unwrap();
        assert!(bulletin.samples.is_empty());
        assert_eq!(bulletin.dropped, 1);
    }
}
