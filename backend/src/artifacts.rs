//! Startup artifact loading
//!
//! Every configured artifact is loaded once, before the server accepts
//! requests, into an immutable [`Artifacts`] context. Any failure leaves the
//! process in [`Readiness::NotReady`] for its whole lifetime.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use shared::inference::{InferenceError, LstmClassifier, LstmClassifierSpec, RandomForest, RandomForestSpec, SequenceClassifier};
use shared::normalizer::{MinMaxNormalizer, NormalizerError, NormalizerParams};
use shared::registry::{HorizonRegistry, NeighborhoodRegistry, RegistryError};
use shared::{Horizon, NeighborhoodRecord, NUM_FEATURES};
use thiserror::Error;

use crate::config::ArtifactsConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: column '{column}' not found", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("invalid normalizer {}: {source}", .path.display())]
    Normalizer {
        path: PathBuf,
        #[source]
        source: NormalizerError,
    },

    #[error("invalid model {}: {source}", .path.display())]
    Model {
        path: PathBuf,
        #[source]
        source: InferenceError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Inconsistent(String),
}

/// Raw-sequence LSTM with the normalizer fitted alongside it
#[derive(Debug, Clone)]
pub struct RawSequenceModel {
    pub model: LstmClassifier,
    pub normalizer: MinMaxNormalizer,
}

/// Everything loaded at startup, shared read-only by all requests
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub normalizer: MinMaxNormalizer,
    pub neighborhoods: NeighborhoodRegistry,
    pub horizons: HorizonRegistry,
    pub forest: Option<RandomForest>,
    pub raw_sequence: Option<RawSequenceModel>,
}

/// Loaded artifact counts reported by the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub neighborhoods: usize,
    pub horizons: Vec<&'static str>,
    pub random_forest: bool,
    pub raw_sequence_lstm: bool,
}

impl Artifacts {
    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            neighborhoods: self.neighborhoods.len(),
            horizons: Horizon::ALL.iter().map(Horizon::id).collect(),
            random_forest: self.forest.is_some(),
            raw_sequence_lstm: self.raw_sequence.is_some(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Readiness {
    Ready(Arc<Artifacts>),
    NotReady { reason: String },
}

impl Readiness {
    /// Load every configured artifact, logging the outcome
    pub fn load(config: &ArtifactsConfig) -> Self {
        match load_all(config) {
            Ok(artifacts) => {
                tracing::info!(
                    neighborhoods = artifacts.neighborhoods.len(),
                    random_forest = artifacts.forest.is_some(),
                    raw_sequence_lstm = artifacts.raw_sequence.is_some(),
                    "Artifacts loaded"
                );
                tracing::warn!(
                    "The shared normalizer was fitted on the 1-day training data and is reused for the 3- and 5-day models"
                );
                Readiness::Ready(Arc::new(artifacts))
            }
            Err(e) => {
                tracing::error!("Failed to load artifacts, service is not ready: {}", e);
                Readiness::NotReady {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn artifacts(&self) -> AppResult<&Artifacts> {
        match self {
            Readiness::Ready(artifacts) => Ok(artifacts.as_ref()),
            Readiness::NotReady { reason } => Err(AppError::NotReady(reason.clone())),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready(_))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_normalizer(path: &Path) -> Result<MinMaxNormalizer, ArtifactError> {
    let params: NormalizerParams = read_json(path)?;
    MinMaxNormalizer::from_params(params).map_err(|source| ArtifactError::Normalizer {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_sequence_model(path: &Path) -> Result<LstmClassifier, ArtifactError> {
    let spec: LstmClassifierSpec = read_json(path)?;
    LstmClassifier::try_from(spec).map_err(|source| ArtifactError::Model {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_forest(path: &Path) -> Result<RandomForest, ArtifactError> {
    let spec: RandomForestSpec = read_json(path)?;
    let forest = RandomForest::try_from(spec).map_err(|source| ArtifactError::Model {
        path: path.to_path_buf(),
        source,
    })?;
    if forest.n_features() != NUM_FEATURES {
        return Err(ArtifactError::Inconsistent(format!(
            "{}: forest expects {} features, required {}",
            path.display(),
            forest.n_features(),
            NUM_FEATURES
        )));
    }
    Ok(forest)
}

/// Parse a cell the way a dataframe would: numbers when they look numeric
/// (a decimal comma is accepted), strings otherwise
fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    cell.parse::<f64>()
        .or_else(|_| cell.replace(',', ".").parse::<f64>())
        .ok()
        .filter(|v| v.is_finite())
}

fn cell_value(cell: &str) -> Value {
    parse_number(cell)
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.trim().to_string()))
}

pub fn load_neighborhoods(
    path: &Path,
    key_column: &str,
    infestation_column: &str,
) -> Result<NeighborhoodRegistry, ArtifactError> {
    let csv_error = |source| ArtifactError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    let key_index = headers
        .iter()
        .position(|h| h == key_column)
        .ok_or_else(|| ArtifactError::MissingColumn {
            path: path.to_path_buf(),
            column: key_column.to_string(),
        })?;
    let infestation_index = headers.iter().position(|h| h == infestation_column);
    if infestation_index.is_none() {
        tracing::warn!(
            column = infestation_column,
            "Infestation column missing from {}; risk requests will fail",
            path.display()
        );
    }

    let mut registry = NeighborhoodRegistry::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;

        let name = record.get(key_index).unwrap_or_default();
        if name.trim().is_empty() {
            continue;
        }

        let attributes: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), cell_value(cell)))
            .collect();
        let infestation = infestation_index
            .and_then(|i| record.get(i))
            .and_then(parse_number);

        if !registry.insert(NeighborhoodRecord::new(name, infestation, attributes)) {
            tracing::warn!(neighborhood = name.trim(), "Duplicate neighborhood row ignored");
        }
    }

    tracing::debug!(count = registry.len(), "Loaded neighborhood table");
    Ok(registry)
}

pub fn load_all(config: &ArtifactsConfig) -> Result<Artifacts, ArtifactError> {
    let normalizer = load_normalizer(&config.normalizer)?;
    let neighborhoods = load_neighborhoods(
        &config.neighborhoods,
        &config.neighborhood_column,
        &config.infestation_column,
    )?;

    let mut models: Vec<(Horizon, Arc<dyn SequenceClassifier>)> = Vec::with_capacity(3);
    for (horizon, path) in [
        (Horizon::OneDay, &config.model_1d),
        (Horizon::ThreeDays, &config.model_3d),
        (Horizon::FiveDays, &config.model_5d),
    ] {
        let model = load_sequence_model(path)?;
        tracing::debug!(horizon = %horizon, units = ?model.layer_units(), "Loaded sequence model");
        models.push((horizon, Arc::new(model)));
    }
    let horizons = HorizonRegistry::new(models)?;

    let forest = config.rf_model.as_deref().map(load_forest).transpose()?;

    let raw_sequence = match (&config.lstm_model, &config.lstm_normalizer) {
        (Some(model), Some(normalizer)) => Some(RawSequenceModel {
            model: load_sequence_model(model)?,
            normalizer: load_normalizer(normalizer)?,
        }),
        (None, None) => None,
        _ => {
            return Err(ArtifactError::Inconsistent(
                "lstm_model and lstm_normalizer must be configured together".to_string(),
            ))
        }
    };
    if let Some(raw) = &raw_sequence {
        if raw.model.n_features() != NUM_FEATURES {
            return Err(ArtifactError::Inconsistent(format!(
                "raw-sequence LSTM expects {} features, required {}",
                raw.model.n_features(),
                NUM_FEATURES
            )));
        }
    }

    Ok(Artifacts {
        normalizer,
        neighborhoods,
        horizons,
        forest,
        raw_sequence,
    })
}
