//! Shared fixtures for the backend integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDateTime};
use serde_json::{Map, Value};
use shared::inference::{InferenceError, SequenceBatch, SequenceClassifier};
use shared::normalizer::{MinMaxNormalizer, NormalizerParams};
use shared::registry::{HorizonRegistry, NeighborhoodRegistry};
use shared::{CurrentConditions, ForecastStep, Horizon, NeighborhoodRecord};
use tower::ServiceExt;

use dengue_risk_backend::artifacts::{Artifacts, Readiness};
use dengue_risk_backend::config::{ArtifactsConfig, Config, ServerConfig, WeatherConfig};
use dengue_risk_backend::error::{AppError, AppResult};
use dengue_risk_backend::{create_app, AppState, WeatherProvider};

// ============================================================================
// Weather
// ============================================================================

pub enum WeatherOutcome {
    Ok,
    Unavailable,
    ApiError,
}

/// Weather provider returning canned data and counting calls
pub struct FakeWeather {
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastStep>,
    pub outcome: WeatherOutcome,
    pub calls: AtomicUsize,
}

impl FakeWeather {
    pub fn new(current: CurrentConditions, forecast: Vec<ForecastStep>) -> Self {
        Self {
            current,
            forecast,
            outcome: WeatherOutcome::Ok,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(outcome: WeatherOutcome) -> Self {
        Self {
            outcome,
            ..Self::new(current(22.0, 50.0), forecast_steps(40))
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond<T: Clone>(&self, value: &T) -> AppResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            WeatherOutcome::Ok => Ok(value.clone()),
            WeatherOutcome::Unavailable => {
                Err(AppError::WeatherServiceUnavailable("connection refused".to_string()))
            }
            WeatherOutcome::ApiError => Err(AppError::WeatherApi("401 Unauthorized".to_string())),
        }
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn current_conditions(&self) -> AppResult<CurrentConditions> {
        self.respond(&self.current)
    }

    async fn forecast(&self) -> AppResult<Vec<ForecastStep>> {
        self.respond(&self.forecast)
    }
}

pub fn current(temperature: f64, humidity: f64) -> CurrentConditions {
    CurrentConditions {
        temperature_celsius: temperature,
        feels_like_celsius: temperature + 1.0,
        humidity_percent: humidity,
        weather_description: "nublado".to_string(),
    }
}

/// `count` steps every 3 hours from midnight of 2025-11-06; within each day
/// the temperature climbs 20..27 and pop climbs 0.0..0.7
pub fn forecast_steps(count: usize) -> Vec<ForecastStep> {
    let start = NaiveDateTime::parse_from_str("2025-11-06 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    (0..count)
        .map(|i| {
            let slot = (i % 8) as f64;
            ForecastStep {
                timestamp: start + Duration::hours(3 * i as i64),
                temperature_celsius: 20.0 + slot,
                temp_min_celsius: 19.0 + slot,
                temp_max_celsius: 21.0 + slot,
                humidity_percent: 70.0,
                rain_3h_mm: 0.5,
                pop: slot * 0.1,
                weather_condition: "Clouds".to_string(),
                weather_description: "nublado".to_string(),
            }
        })
        .collect()
}

// ============================================================================
// Models
// ============================================================================

/// Sequence model returning a fixed probability and keeping the last batch
pub struct ConstantModel {
    pub steps: usize,
    pub probability: f64,
    pub last_batch: Mutex<Option<SequenceBatch>>,
}

impl ConstantModel {
    pub fn new(steps: usize, probability: f64) -> Self {
        Self {
            steps,
            probability,
            last_batch: Mutex::new(None),
        }
    }
}

impl SequenceClassifier for ConstantModel {
    fn sequence_length(&self) -> usize {
        self.steps
    }

    fn n_features(&self) -> usize {
        4
    }

    fn predict_proba(&self, batch: &SequenceBatch) -> Result<Vec<f64>, InferenceError> {
        self.check_shape(batch)?;
        *self.last_batch.lock().unwrap() = Some(batch.clone());
        Ok(vec![self.probability; batch.batch_size()])
    }
}

/// One constant model per horizon, returned for inspection
pub fn horizon_models(probability: f64) -> Vec<(Horizon, Arc<ConstantModel>)> {
    Horizon::ALL
        .iter()
        .map(|h| (*h, Arc::new(ConstantModel::new(h.sequence_length(), probability))))
        .collect()
}

/// Normalizer mapping every column from [0, 100] to [0, 1]
pub fn percent_normalizer() -> MinMaxNormalizer {
    MinMaxNormalizer::from_params(NormalizerParams {
        feature_range: (0.0, 1.0),
        data_min: vec![0.0; 4],
        data_max: vec![100.0; 4],
    })
    .unwrap()
}

pub fn neighborhood(name: &str, infestation_index: Option<f64>) -> NeighborhoodRecord {
    let mut attributes = Map::new();
    attributes.insert("BAIRRO".to_string(), Value::String(name.to_string()));
    if let Some(iip) = infestation_index {
        attributes.insert("IIP%".to_string(), serde_json::json!(iip));
    }
    NeighborhoodRecord::new(name, infestation_index, attributes)
}

pub fn artifacts_with(models: &[(Horizon, Arc<ConstantModel>)]) -> Artifacts {
    let mut neighborhoods = NeighborhoodRegistry::new();
    neighborhoods.insert(neighborhood("CENTRO", Some(12.5)));
    neighborhoods.insert(neighborhood("VILA MAURICEIA", Some(3.0)));
    neighborhoods.insert(neighborhood("SEM INDICE", None));

    let horizons = HorizonRegistry::new(models.iter().map(|(h, m)| {
        let model: Arc<dyn SequenceClassifier> = m.clone();
        (*h, model)
    }))
    .unwrap();

    Artifacts {
        normalizer: percent_normalizer(),
        neighborhoods,
        horizons,
        forest: None,
        raw_sequence: None,
    }
}

// ============================================================================
// Application
// ============================================================================

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        weather: weather_config(),
        artifacts: ArtifactsConfig {
            normalizer: "missing/normalizer.json".into(),
            neighborhoods: "missing/neighborhoods.csv".into(),
            neighborhood_column: "BAIRRO".to_string(),
            infestation_column: "IIP%".to_string(),
            model_1d: "missing/1d.json".into(),
            model_3d: "missing/3d.json".into(),
            model_5d: "missing/5d.json".into(),
            rf_model: None,
            lstm_model: None,
            lstm_normalizer: None,
        },
    }
}

pub fn weather_config() -> WeatherConfig {
    WeatherConfig {
        api_endpoint: "http://127.0.0.1:9".to_string(),
        api_key: "test-key".to_string(),
        city: "Montes Claros".to_string(),
        state: "MG".to_string(),
        country: "BR".to_string(),
        units: "metric".to_string(),
        lang: "pt_br".to_string(),
        timeout_secs: 1,
    }
}

pub fn app(readiness: Readiness, weather: Arc<FakeWeather>) -> Router {
    create_app(AppState {
        config: Arc::new(test_config()),
        readiness: Arc::new(readiness),
        weather,
    })
}

pub fn ready(artifacts: Artifacts) -> Readiness {
    Readiness::Ready(Arc::new(artifacts))
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}
