//! Route definitions for the dengue risk service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Model-based neighborhood risk (?dias=1|3|5)
        .route("/prever_risco/:bairro", get(handlers::assess_risk))
        // Threshold weather alert
        .route("/previsao/:bairro", get(handlers::weather_alert))
        // Direct predictions from caller-supplied features
        .route("/prever_surto_rf", post(handlers::predict_weekly))
        .route("/prever_surto_dengue", post(handlers::predict_sequence))
}
