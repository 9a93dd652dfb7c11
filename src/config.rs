//! Service configuration.
//!
//! Settings come from an optional TOML file; every field has a default so a
//! missing file is fine. Credentials are only ever read from the
//! environment (optionally populated from `.env`).

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::alert::staleness::DEFAULT_STALE_AFTER_MINUTES;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "RIFFLE_CONFIG";

/// Environment variable holding the OpenWeather API key.
pub const OPENWEATHER_KEY_ENV: &str = "OPENWEATHER_KEY";

/// Config file used when `RIFFLE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "./riffle.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub usgs_base_url: String,
    pub nwrfc_base_url: String,
    pub weather_base_url: String,
    pub report_list_url: String,
    /// Per-request upstream timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Warn when a river's newest flow sample is older than this.
    pub stale_after_minutes: i64,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Append log lines to this file as well as stderr.
    pub log_file: Option<String>,
    /// Never read from TOML; filled from `OPENWEATHER_KEY`.
    #[serde(skip)]
    pub openweather_key: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            usgs_base_url: "https://waterservices.usgs.gov/nwis/iv/".to_string(),
            nwrfc_base_url: "https://www.nwrfc.noaa.gov/xml/xml.cgi".to_string(),
            weather_base_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            report_list_url: "https://oregonflyfishingblog.com/category/fishing-reports/".to_string(),
            timeout_secs: 10,
            user_agent: concat!("riffle_service/", env!("CARGO_PKG_VERSION")).to_string(),
            stale_after_minutes: DEFAULT_STALE_AFTER_MINUTES,
            log_level: "info".to_string(),
            log_file: None,
            openweather_key: None,
        }
    }
}

impl ServiceConfig {
    /// Parses a config from TOML text and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config file at `path`. A missing file yields defaults; an
    /// unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `.env`, then the config file named by `RIFFLE_CONFIG` (or
    /// `./riffle.toml`), then credentials from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(Path::new(&path))?;
        config.openweather_key = std::env::var(OPENWEATHER_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be at least 1".to_string()));
        }
        if self.stale_after_minutes <= 0 {
            return Err(ConfigError::Invalid("stale_after_minutes must be positive".to_string()));
        }
        for (name, url) in [
            ("usgs_base_url", &self.usgs_base_url),
            ("nwrfc_base_url", &self.nwrfc_base_url),
            ("weather_base_url", &self.weather_base_url),
            ("report_list_url", &self.report_list_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!("{} must be an http(s) URL, got '{}'", name, url)));
            }
        }
        Ok(())
    }
}
