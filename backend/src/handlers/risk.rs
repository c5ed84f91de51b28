//! HTTP handlers for neighborhood risk and weather alerts

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{NeighborhoodAlert, RiskAssessment};

use crate::error::AppResult;
use crate::services::{AlertService, RiskService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RiskQuery {
    pub dias: Option<String>,
}

/// Model-based risk over 1, 3 or 5 days
pub async fn assess_risk(
    State(state): State<AppState>,
    Path(neighborhood): Path<String>,
    Query(query): Query<RiskQuery>,
) -> AppResult<Json<RiskAssessment>> {
    let artifacts = state.readiness.artifacts()?;
    let service = RiskService::new(artifacts, state.weather.clone());
    let assessment = service.assess(&neighborhood, query.dias.as_deref()).await?;
    Ok(Json(assessment))
}

/// Threshold weather alert
pub async fn weather_alert(
    State(state): State<AppState>,
    Path(neighborhood): Path<String>,
) -> AppResult<Json<NeighborhoodAlert>> {
    let artifacts = state.readiness.artifacts()?;
    let service = AlertService::new(artifacts, state.weather.clone());
    let alert = service.alert(&neighborhood).await?;
    Ok(Json(alert))
}
