//! HTTP handlers for direct outbreak predictions

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use shared::OutbreakPrediction;

use crate::error::{AppError, AppResult};
use crate::services::PredictionService;
use crate::AppState;

const SEQUENCE_FIELD: &str = "sequencia";

/// Unwrap a JSON body, mapping a missing `Content-Type` to 415
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> AppResult<Value> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Err(AppError::UnsupportedMediaType),
        Err(rejection) => Err(AppError::Validation {
            message: rejection.body_text(),
            message_pt: "Corpo da requisição não é um JSON válido.".to_string(),
            field: None,
        }),
    }
}

/// Random Forest prediction from weekly aggregates
pub async fn predict_weekly(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<OutbreakPrediction>> {
    let artifacts = state.readiness.artifacts()?;
    let body = json_body(payload)?;
    let prediction = PredictionService::new(artifacts).predict_weekly(&body)?;
    Ok(Json(prediction))
}

/// Raw-sequence LSTM prediction
pub async fn predict_sequence(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<OutbreakPrediction>> {
    let artifacts = state.readiness.artifacts()?;
    let body = json_body(payload)?;

    let sequence = body.get(SEQUENCE_FIELD).ok_or_else(|| AppError::Validation {
        message: "missing 'sequencia' field".to_string(),
        message_pt: "Campo 'sequencia' ausente.".to_string(),
        field: Some(SEQUENCE_FIELD.to_string()),
    })?;
    let sequence: Vec<Vec<f64>> =
        serde_json::from_value(sequence.clone()).map_err(|e| AppError::Validation {
            message: format!("'sequencia' must be a list of numeric rows: {}", e),
            message_pt: "O campo 'sequencia' deve ser uma lista de linhas numéricas.".to_string(),
            field: Some(SEQUENCE_FIELD.to_string()),
        })?;

    let prediction = PredictionService::new(artifacts).predict_sequence(&sequence)?;
    Ok(Json(prediction))
}
