//! Error handling for the dengue risk service
//!
//! Every error renders a structured payload in Portuguese and English. The
//! top-level `erro` key carries the Portuguese message shown by the browser
//! client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::inference::InferenceError;
use shared::models::InvalidHorizon;
use shared::registry::RegistryError;
use shared::resampler::ResampleError;
use shared::validation::{SequenceShapeError, WeeklyInputError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Readiness
    #[error("Service not ready: {0}")]
    NotReady(String),

    // Client input errors
    #[error("Invalid analysis period: {0:?}")]
    InvalidPeriod(Option<String>),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        message_pt: String,
        field: Option<String>,
    },

    #[error("Missing input features: {0:?}")]
    MissingFeatures(Vec<&'static str>),

    #[error("Unsupported media type")]
    UnsupportedMediaType,

    #[error("Neighborhood not found: {0}")]
    NeighborhoodNotFound(String),

    // Data integrity errors
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Insufficient forecast: {available} of {required} steps for {days} day(s)")]
    InsufficientForecast {
        available: usize,
        required: usize,
        days: usize,
    },

    // Model errors
    #[error("Model not loaded: {0}")]
    ModelNotLoaded(&'static str),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    // External service errors
    #[error("Weather API error: {0}")]
    WeatherApi(String),

    #[error("Weather service unavailable: {0}")]
    WeatherServiceUnavailable(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<InvalidHorizon> for AppError {
    fn from(err: InvalidHorizon) -> Self {
        AppError::InvalidPeriod(Some(err.0))
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NeighborhoodNotFound(name) => AppError::NeighborhoodNotFound(name),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<WeeklyInputError> for AppError {
    fn from(err: WeeklyInputError) -> Self {
        match err {
            WeeklyInputError::MissingFeatures(missing) => AppError::MissingFeatures(missing),
            WeeklyInputError::NotNumeric(field) => AppError::Validation {
                message: err.to_string(),
                message_pt: format!("O campo '{}' deve ser numérico.", field),
                field: Some(field.to_string()),
            },
            WeeklyInputError::NotAnObject => AppError::Validation {
                message: err.to_string(),
                message_pt: "O corpo da requisição deve ser um objeto JSON.".to_string(),
                field: None,
            },
        }
    }
}

impl From<SequenceShapeError> for AppError {
    fn from(err: SequenceShapeError) -> Self {
        AppError::Validation {
            message: err.to_string(),
            message_pt: format!(
                "A sequência deve ter o formato [{}, {}], mas foi recebido [{}, {}].",
                err.expected[0], err.expected[1], err.received[0], err.received[1]
            ),
            field: Some("sequencia".to_string()),
        }
    }
}

impl AppError {
    pub fn insufficient_forecast(err: ResampleError, days: usize) -> Self {
        match err {
            ResampleError::InsufficientData { available, required } => AppError::InsufficientForecast {
                available,
                required,
                days,
            },
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub erro: String,
    /// Required weekly fields, only for incomplete prediction input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features_necessarias: Option<Vec<&'static str>>,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_pt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    fn new(code: &str, message_en: impl Into<String>, message_pt: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message_en: message_en.into(),
            message_pt: message_pt.into(),
            field: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::NotReady(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "SERVICE_NOT_READY",
                    "The service is not ready. Check the server logs.",
                    "Erro interno: A API não está pronta. Verifique os logs do servidor.",
                ),
            ),
            AppError::InvalidPeriod(_) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some("dias".to_string()),
                    ..ErrorDetail::new(
                        "INVALID_PERIOD",
                        "Invalid analysis period. Use '1', '3' or '5'.",
                        "Período de dias inválido. Use '1', '3' ou '5'.",
                    )
                },
            ),
            AppError::Validation {
                message,
                message_pt,
                field,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: field.clone(),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone(), message_pt.clone())
                },
            ),
            AppError::MissingFeatures(_) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "MISSING_FEATURES",
                    "Incomplete input data.",
                    "Dados de entrada incompletos.",
                ),
            ),
            AppError::UnsupportedMediaType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorDetail::new(
                    "UNSUPPORTED_MEDIA_TYPE",
                    "Invalid request. The 'Content-Type' header must be 'application/json'.",
                    "Requisição inválida. O cabeçalho 'Content-Type' deve ser 'application/json'.",
                ),
            ),
            AppError::NeighborhoodNotFound(name) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "NEIGHBORHOOD_NOT_FOUND",
                    format!("Neighborhood '{}' not found in the database.", name),
                    format!("Bairro '{}' não encontrado na base de dados.", name),
                ),
            ),
            AppError::DataIntegrity(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "DATA_INTEGRITY_ERROR",
                    msg.clone(),
                    format!("Erro interno nos dados locais: {}", msg),
                ),
            ),
            AppError::InsufficientForecast {
                available,
                days,
                ..
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "INSUFFICIENT_FORECAST",
                    format!(
                        "The weather API returned too few steps ({}) for a {} day(s) analysis.",
                        available, days
                    ),
                    format!(
                        "A API de tempo não retornou dados suficientes ({} passos) para a análise de {} dia(s).",
                        available, days
                    ),
                ),
            ),
            AppError::ModelNotLoaded(model) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "MODEL_NOT_LOADED",
                    format!("{} model not loaded. Check the server logs.", model),
                    "Modelo não carregado. Verifique os logs do servidor.",
                ),
            ),
            AppError::Inference(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "INFERENCE_ERROR",
                    format!("Model inference failed: {}", err),
                    "Erro interno ao executar o modelo.",
                ),
            ),
            AppError::WeatherApi(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new(
                    "WEATHER_API_ERROR",
                    format!("Error fetching weather data: {}", msg),
                    format!("Erro ao buscar dados de meteorologia: {}", msg),
                ),
            ),
            AppError::WeatherServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail::new(
                    "WEATHER_SERVICE_UNAVAILABLE",
                    format!("Could not connect to the weather API: {}", msg),
                    format!("Erro de conexão com a API de meteorologia: {}", msg),
                ),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone(), "Erro interno do servidor."),
            ),
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Client error: {:?}", self);
        }

        let features_necessarias = match &self {
            AppError::MissingFeatures(_) => Some(shared::WeeklyAggregate::FIELDS.to_vec()),
            _ => None,
        };

        let body = ErrorResponse {
            erro: error_detail.message_pt.clone(),
            features_necessarias,
            error: error_detail,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
