//! Common feature types used across the service

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Number of model input features per time step
pub const NUM_FEATURES: usize = 4;

/// Model input row, always in the column order
/// (temperature, humidity, rainfall, infestation index)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub infestation_index: f64,
}

impl FeatureRow {
    pub fn new(temperature: f64, humidity: f64, rainfall: f64, infestation_index: f64) -> Self {
        Self {
            temperature,
            humidity,
            rainfall,
            infestation_index,
        }
    }

    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.temperature,
            self.humidity,
            self.rainfall,
            self.infestation_index,
        ]
    }

    /// Stack rows into an `(n, 4)` matrix, one row per time step
    pub fn matrix(rows: &[FeatureRow]) -> Array2<f64> {
        Array2::from_shape_fn((rows.len(), NUM_FEATURES), |(step, column)| {
            rows[step].to_array()[column]
        })
    }
}

/// Weekly aggregate features consumed by the Random Forest model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAggregate {
    #[serde(rename = "temperatura_media_semana")]
    pub mean_temperature: f64,
    #[serde(rename = "umidade_media_semana")]
    pub mean_humidity: f64,
    #[serde(rename = "total_chuva_semana_mm")]
    pub total_rainfall_mm: f64,
    #[serde(rename = "iip_bairro")]
    pub infestation_index: f64,
}

impl WeeklyAggregate {
    /// Request field names, in model column order
    pub const FIELDS: [&'static str; NUM_FEATURES] = [
        "temperatura_media_semana",
        "umidade_media_semana",
        "total_chuva_semana_mm",
        "iip_bairro",
    ];

    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.mean_temperature,
            self.mean_humidity,
            self.total_rainfall_mm,
            self.infestation_index,
        ]
    }
}
