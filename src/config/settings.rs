use anyhow::Result;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub region: RegionConfig,
    pub weather: WeatherConfig,
    pub search: SearchConfig,
    pub places: PlacesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Region token appended to search queries that name no location.
    pub default_region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub base_url: String,
    pub units: String,
    pub lang: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_results: usize,
    pub deep_max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    pub index_url: String,
    pub timeout_secs: u64,
    pub result_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_env = env::var("CONFIG_ENV").unwrap_or_else(|_| "default".to_string());

        let config = Config::builder()
            .add_source(File::with_name(&format!("config/{}", config_env)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Weather provider key. Secrets come from the environment only.
    pub fn weather_api_key() -> Result<String> {
        env::var("OPENWEATHER_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENWEATHER_API_KEY environment variable not set"))
    }

    /// Search provider key.
    pub fn search_api_key() -> Result<String> {
        env::var("TAVILY_API_KEY")
            .map_err(|_| anyhow::anyhow!("TAVILY_API_KEY environment variable not set"))
    }
}
