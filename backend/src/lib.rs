//! Dengue Risk Service - Backend
//!
//! HTTP API estimating dengue outbreak risk per neighborhood of Montes Claros
//! from weather forecasts, larval infestation indices and trained models.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod artifacts;
pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use artifacts::{Artifacts, Readiness};
pub use config::Config;
pub use external::{WeatherClient, WeatherProvider};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub readiness: Arc<Readiness>,
    pub weather: Arc<dyn WeatherProvider>,
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
