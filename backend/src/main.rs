//! Dengue Risk Service - Backend Server

use std::{net::SocketAddr, sync::Arc};

use dengue_risk_backend::{create_app, AppState, Config, Readiness, WeatherClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dengue_risk_server=debug,dengue_risk_backend=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Dengue Risk Server");
    tracing::info!("Environment: {}", config.environment);

    if config.weather.api_key.is_empty() {
        tracing::warn!("No weather API key configured; weather requests will be rejected upstream");
    }

    // Load models and lookup tables once; failures keep the server up but not ready
    tracing::info!("Loading artifacts...");
    let readiness = Readiness::load(&config.artifacts);

    let weather = WeatherClient::new(&config.weather)?;
    tracing::info!("Weather location: {}", config.weather.location());

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        readiness: Arc::new(readiness),
        weather: Arc::new(weather),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let ip: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((ip, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
