//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::artifacts::{ArtifactSummary, Readiness};
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ArtifactSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, artifacts, reason) = match state.readiness.as_ref() {
        Readiness::Ready(artifacts) => ("healthy", Some(artifacts.summary()), None),
        Readiness::NotReady { reason } => ("not_ready", None, Some(reason.clone())),
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        ready: state.readiness.is_ready(),
        artifacts,
        reason,
    })
}

/// Root endpoint
pub async fn root() -> &'static str {
    "Dengue Risk API v1.0"
}
