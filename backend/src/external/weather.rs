//! Weather API client for fetching weather data
//!
//! Integrates with the OpenWeatherMap current-conditions and 5-day/3-hour
//! forecast endpoints for the configured city.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::{CurrentConditions, ForecastStep};

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

/// Source of current conditions and 3-hour forecasts
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_conditions(&self) -> AppResult<CurrentConditions>;

    /// Forecast steps in chronological order, as returned by the provider
    async fn forecast(&self) -> AppResult<Vec<ForecastStep>>;
}

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    location: String,
    units: String,
    lang: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    #[serde(default)]
    weather: Vec<OWMWeather>,
    main: OWMMain,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    humidity: f64,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    #[serde(default)]
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    #[serde(default)]
    dt: Option<i64>,
    #[serde(default)]
    dt_txt: Option<String>,
    main: OWMMain,
    #[serde(default)]
    weather: Vec<OWMWeather>,
    #[serde(default)]
    pop: f64,
    #[serde(default)]
    rain: Option<OWMForecastRain>,
}

#[derive(Debug, Deserialize)]
struct OWMForecastRain {
    #[serde(rename = "3h", default)]
    three_hour: Option<f64>,
}

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl WeatherClient {
    /// Create a new WeatherClient from configuration
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        Self::with_base_url(config, config.api_endpoint.clone())
    }

    /// Create a new WeatherClient with custom base URL (for testing)
    pub fn with_base_url(config: &WeatherConfig, base_url: String) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            location: config.location(),
            units: config.units.clone(),
            lang: config.lang.clone(),
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &str) -> AppResult<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(endpoint, location = %self.location, "Requesting weather data");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", self.location.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::WeatherServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, endpoint, "Weather API returned an error");
            return Err(AppError::WeatherApi(format!("{} - {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::WeatherServiceUnavailable(e.to_string()))?;

        serde_json::from_str(&body)
            .map_err(|e| AppError::WeatherApi(format!("malformed {} response: {}", endpoint, e)))
    }

    /// Convert OpenWeatherMap current response to our format
    fn convert_current_response(data: OWMCurrentResponse) -> CurrentConditions {
        let weather = data.weather.first();

        CurrentConditions {
            temperature_celsius: data.main.temp,
            feels_like_celsius: data.main.feels_like.unwrap_or(data.main.temp),
            humidity_percent: data.main.humidity,
            weather_description: weather.map(|w| w.description.clone()).unwrap_or_default(),
        }
    }

    /// Convert OpenWeatherMap forecast response to our format
    fn convert_forecast_response(data: OWMForecastResponse) -> AppResult<Vec<ForecastStep>> {
        data.list
            .into_iter()
            .map(|item| {
                let timestamp = item_timestamp(&item)?;
                let weather = item.weather.first();
                Ok(ForecastStep {
                    timestamp,
                    temperature_celsius: item.main.temp,
                    temp_min_celsius: item.main.temp_min.unwrap_or(item.main.temp),
                    temp_max_celsius: item.main.temp_max.unwrap_or(item.main.temp),
                    humidity_percent: item.main.humidity,
                    rain_3h_mm: item.rain.and_then(|r| r.three_hour).unwrap_or(0.0),
                    pop: item.pop,
                    weather_condition: weather.map(|w| w.main.clone()).unwrap_or_default(),
                    weather_description: weather.map(|w| w.description.clone()).unwrap_or_default(),
                })
            })
            .collect()
    }
}

fn item_timestamp(item: &OWMForecastItem) -> AppResult<NaiveDateTime> {
    if let Some(text) = &item.dt_txt {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, DT_TXT_FORMAT) {
            return Ok(timestamp);
        }
    }
    item.dt
        .and_then(|dt| DateTime::from_timestamp(dt, 0))
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| AppError::WeatherApi("forecast entry without a valid timestamp".to_string()))
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn current_conditions(&self) -> AppResult<CurrentConditions> {
        let data: OWMCurrentResponse = self.fetch("weather").await?;
        Ok(Self::convert_current_response(data))
    }

    async fn forecast(&self) -> AppResult<Vec<ForecastStep>> {
        let data: OWMForecastResponse = self.fetch("forecast").await?;
        let steps = Self::convert_forecast_response(data)?;
        tracing::debug!(steps = steps.len(), "Received forecast");
        Ok(steps)
    }
}
