/// OpenWeather current-conditions lookup
///
/// Uses the river's registry coordinates. Any failure (unknown river,
/// missing API key, network, bad payload) is logged and turned into
/// `WeatherSummary::unavailable()`; nothing propagates to the caller.
///
/// API Documentation: https://openweathermap.org/current

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::{OPENWEATHER_KEY_ENV, ServiceConfig};
use crate::logging::{DataSource, log_source_failure};
use crate::model::CollaboratorError;
use crate::stations::find_river;

// ============================================================================
// OpenWeather Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OwmResponse {
    pub main: OwmMain,
    #[serde(default)]
    pub weather: Vec<OwmWeather>,
    pub wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
pub struct OwmMain {
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
pub struct OwmWeather {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct OwmWind {
    pub speed: f64,
}

/// Weather as shown next to a river's flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    #[serde(rename = "airTempF")]
    pub air_temp_f: Option<f64>,
    pub conditions: String,
    #[serde(rename = "windMPH")]
    pub wind_mph: Option<f64>,
}

impl WeatherSummary {
    pub fn unavailable() -> Self {
        Self {
            air_temp_f: None,
            conditions: "Unavailable".to_string(),
            wind_mph: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.air_temp_f.is_some()
    }
}

pub fn build_weather_url(base_url: &str, latitude: f64, longitude: f64, api_key: &str) -> String {
    format!(
        "{}?lat={}&lon={}&units=imperial&appid={}",
        base_url, latitude, longitude, api_key
    )
}

/// Convert an OpenWeather body (imperial units) into a summary.
pub fn parse_weather_response(body: &str) -> Result<WeatherSummary, CollaboratorError> {
    let response: OwmResponse = serde_json::from_str(body).map_err(|e| CollaboratorError::Parse(e.to_string()))?;
    let conditions = response
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or_else(|| CollaboratorError::Parse("no weather description".to_string()))?;

    Ok(WeatherSummary {
        air_temp_f: Some(response.main.temp.round()),
        conditions,
        wind_mph: response.wind.map(|w| w.speed),
    })
}

fn try_fetch_weather(client: &Client, config: &ServiceConfig, river_id: &str) -> Result<WeatherSummary, CollaboratorError> {
    let profile = find_river(river_id).ok_or_else(|| CollaboratorError::UnknownRiver(river_id.to_string()))?;
    let api_key = config
        .openweather_key
        .as_deref()
        .ok_or(CollaboratorError::MissingCredential(OPENWEATHER_KEY_ENV))?;

    let url = build_weather_url(&config.weather_base_url, profile.latitude, profile.longitude, api_key);
    let response = client.get(&url).send()?;
    if !response.status().is_success() {
        return Err(CollaboratorError::Http(response.status().as_u16()));
    }
    parse_weather_response(&response.text()?)
}

/// Current weather at a river, or the "unavailable" summary on any failure.
pub fn fetch_weather(client: &Client, config: &ServiceConfig, river_id: &str) -> WeatherSummary {
    match try_fetch_weather(client, config, river_id) {
        Ok(summary) => summary,
        Err(e) => {
            log_source_failure(DataSource::OpenWeather, river_id, "fetch_weather", &e.to_string());
            WeatherSummary::unavailable()
        }
    }
}
