//! Weather data models

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One 3-hour forecast entry from the weather provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastStep {
    pub timestamp: NaiveDateTime,
    pub temperature_celsius: f64,
    pub temp_min_celsius: f64,
    pub temp_max_celsius: f64,
    pub humidity_percent: f64,
    /// Rain volume over the 3-hour interval; 0 when the provider omits it
    pub rain_3h_mm: f64,
    /// Probability of precipitation (0-1)
    pub pop: f64,
    /// Condition group, e.g. "Rain" or "Clouds"
    pub weather_condition: String,
    /// Localized condition description, e.g. "chuva leve"
    pub weather_description: String,
}

impl ForecastStep {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Current conditions at the configured city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(rename = "temperatura_atual_celsius")]
    pub temperature_celsius: f64,
    #[serde(rename = "sensacao_termica_celsius")]
    pub feels_like_celsius: f64,
    #[serde(rename = "umidade_percentual")]
    pub humidity_percent: f64,
    #[serde(rename = "descricao_tempo")]
    pub weather_description: String,
}

/// Per-day summary of the 3-hourly forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "minima_c", with = "rust_decimal::serde::float")]
    pub min_celsius: Decimal,
    #[serde(rename = "maxima_c", with = "rust_decimal::serde::float")]
    pub max_celsius: Decimal,
    /// Peak probability of rain during the day, 0-100
    #[serde(rename = "probabilidade_chuva_pct", with = "rust_decimal::serde::float")]
    pub rain_probability_pct: Decimal,
    /// Most frequent condition description of the day
    #[serde(rename = "resumo_tempo")]
    pub conditions: String,
}
