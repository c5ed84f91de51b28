//! Configuration management for the dengue risk service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with DENGUE_ prefix

use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Weather provider configuration
    pub weather: WeatherConfig,

    /// Persisted model and lookup-table locations
    pub artifacts: ArtifactsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// OpenWeatherMap API base URL
    pub api_endpoint: String,

    /// OpenWeatherMap API key
    pub api_key: String,

    pub city: String,
    pub state: String,
    pub country: String,

    /// Unit system requested from the provider
    pub units: String,

    /// Language of condition descriptions
    pub lang: String,

    /// Timeout for each outbound request, in seconds
    pub timeout_secs: u64,
}

impl WeatherConfig {
    /// Provider location query, e.g. "Montes Claros,MG,BR"
    pub fn location(&self) -> String {
        format!("{},{},{}", self.city, self.state, self.country)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArtifactsConfig {
    /// Shared min-max normalizer for the horizon models
    pub normalizer: PathBuf,

    /// Neighborhood lookup table (CSV)
    pub neighborhoods: PathBuf,

    /// Header of the neighborhood name column
    pub neighborhood_column: String,

    /// Header of the infestation index column
    pub infestation_column: String,

    /// Sequence model for the 1-day horizon (8 steps)
    pub model_1d: PathBuf,

    /// Sequence model for the 3-day horizon (24 steps)
    pub model_3d: PathBuf,

    /// Sequence model for the 5-day horizon (40 steps)
    pub model_5d: PathBuf,

    /// Weekly-aggregate Random Forest, if deployed
    pub rf_model: Option<PathBuf>,

    /// Raw-sequence LSTM, if deployed
    pub lstm_model: Option<PathBuf>,

    /// Normalizer fitted alongside the raw-sequence LSTM
    pub lstm_normalizer: Option<PathBuf>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("DENGUE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5010)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("weather.api_key", "")?
            .set_default("weather.city", "Montes Claros")?
            .set_default("weather.state", "MG")?
            .set_default("weather.country", "BR")?
            .set_default("weather.units", "metric")?
            .set_default("weather.lang", "pt_br")?
            .set_default("weather.timeout_secs", 10)?
            .set_default("artifacts.normalizer", "artifacts/scaler_features_dengue.json")?
            .set_default("artifacts.neighborhoods", "artifacts/dengue_classificados_clima.csv")?
            .set_default("artifacts.neighborhood_column", "BAIRRO")?
            .set_default("artifacts.infestation_column", "IIP%")?
            .set_default("artifacts.model_1d", "artifacts/modelo_lstm_24h.json")?
            .set_default("artifacts.model_3d", "artifacts/modelo_lstm_3d.json")?
            .set_default("artifacts.model_5d", "artifacts/modelo_lstm_5d.json")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (DENGUE_ prefix)
            .add_source(
                Environment::with_prefix("DENGUE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5010,
            host: "0.0.0.0".to_string(),
        }
    }
}
