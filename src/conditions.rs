//! Composition layer.
//!
//! Wraps the aggregation engine with the collaborators (weather, fly
//! advice, species, shop report) into the response a caller sees.

use std::thread;

use chrono::{Local, NaiveDate};
use reqwest::blocking::Client;
use serde::Serialize;

use crate::advice::{FlyRecommendation, recommend_fly_setup, target_species};
use crate::aggregate::Aggregator;
use crate::config::ServiceConfig;
use crate::ingest::{TelemetrySource, default_sources, http_client};
use crate::model::RiverRecord;
use crate::report::{ShopReport, scrape_fly_shop};
use crate::weather::{WeatherSummary, fetch_weather};

/// Everything reported for one river.
#[derive(Debug, Clone, Serialize)]
pub struct FishingConditions {
    /// The identifier as requested.
    pub location: String,
    #[serde(flatten)]
    pub record: RiverRecord,
    pub weather: WeatherSummary,
    pub recommendation: FlyRecommendation,
    pub species: Vec<&'static str>,
}

/// Attach the static lookups to already-fetched data.
pub fn compose(
    location: &str,
    record: RiverRecord,
    weather: WeatherSummary,
    today: NaiveDate,
) -> FishingConditions {
    FishingConditions {
        location: location.to_string(),
        record,
        weather,
        recommendation: recommend_fly_setup(location, today),
        species: target_species(location),
    }
}

/// Long-lived service state: configuration, one HTTP client, and the
/// aggregation engine. Safe to share across threads.
pub struct RiverService {
    config: ServiceConfig,
    client: Client,
    aggregator: Aggregator,
}

impl RiverService {
    pub fn new(config: ServiceConfig) -> Result<Self, reqwest::Error> {
        let client = http_client(&config)?;
        let aggregator =
            Aggregator::new(default_sources(&client, &config)).with_stale_after(config.stale_after_minutes);
        Ok(Self { config, client, aggregator })
    }

    /// Build a service around custom telemetry sources.
    pub fn with_sources(config: ServiceConfig, sources: Vec<Box<dyn TelemetrySource>>) -> Result<Self, reqwest::Error> {
        let client = http_client(&config)?;
        let aggregator = Aggregator::new(sources).with_stale_after(config.stale_after_minutes);
        Ok(Self { config, client, aggregator })
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Telemetry and weather are fetched in parallel.
    pub fn conditions(&self, river_id: &str) -> FishingConditions {
        let (record, weather) = thread::scope(|scope| {
            let weather = scope.spawn(|| fetch_weather(&self.client, &self.config, river_id));
            let record = self.aggregator.aggregate(river_id);
            (record, weather.join().unwrap_or_else(|_| WeatherSummary::unavailable()))
        });
        compose(river_id, record, weather, Local::now().date_naive())
    }

    pub fn shop_report(&self) -> ShopReport {
        scrape_fly_shop(&self.client, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_record;

    #[test]
    fn test_compose_flattens_record_fields() {
        let record = build_record("columbia_xyz".to_string(), &[], None);
        let conditions = compose(
            "columbia_xyz",
            record,
            WeatherSummary::unavailable(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        );

        let json = serde_json::to_value(&conditions).unwrap();
        assert_eq!(json["location"], "columbia_xyz");
        assert_eq!(json["riverId"], "columbia_xyz");
        assert_eq!(json["flowHistory"], serde_json::json!([]));
        assert!(json.get("flowStatus").is_none());
        assert!(json.get("thresholds").is_none());
        assert!(json.get("currentFlowCFS").is_none());
        assert_eq!(json["species"], serde_json::json!(["Trout"]));
        assert_eq!(json["weather"]["conditions"], "Unavailable");
    }

    #[test]
    fn test_service_degrades_without_sources_or_credentials() {
        let service = RiverService::with_sources(ServiceConfig::default(), Vec::new()).unwrap();
        let conditions = service.conditions("Willamette_Eugene");

        assert_eq!(conditions.location, "Willamette_Eugene");
        assert_eq!(conditions.record.river_id, "willamette_eugene");
        assert!(conditions.record.flow_history.is_empty());
        assert!(!conditions.weather.is_available());
        assert!(conditions.species.contains(&"Steelhead"));
    }

    #[test]
    fn test_service_applies_configured_stale_threshold() {
        let config = ServiceConfig {
            stale_after_minutes: 45,
            ..ServiceConfig::default()
        };
        let service = RiverService::with_sources(config, Vec::new()).unwrap();
        assert_eq!(service.aggregator().stale_after_minutes(), 45);
    }
}
