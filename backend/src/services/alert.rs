//! Threshold weather alerts for a neighborhood

use std::sync::Arc;

use shared::rules::evaluate_weather_alert;
use shared::NeighborhoodAlert;

use crate::artifacts::Artifacts;
use crate::error::AppResult;
use crate::external::WeatherProvider;

#[derive(Clone)]
pub struct AlertService<'a> {
    artifacts: &'a Artifacts,
    weather: Arc<dyn WeatherProvider>,
}

impl<'a> AlertService<'a> {
    pub fn new(artifacts: &'a Artifacts, weather: Arc<dyn WeatherProvider>) -> Self {
        Self { artifacts, weather }
    }

    pub async fn alert(&self, neighborhood: &str) -> AppResult<NeighborhoodAlert> {
        let record = self.artifacts.neighborhoods.lookup(neighborhood)?;

        let current = self.weather.current_conditions().await?;
        let forecast = self.weather.forecast().await?;

        let alert = evaluate_weather_alert(&current, &forecast);
        tracing::info!(neighborhood = %record.name, level = %alert.level, "Weather alert evaluated");

        Ok(NeighborhoodAlert {
            neighborhood: record.name.clone(),
            alert,
            local_data: record.attributes.clone(),
            current_weather: current,
        })
    }
}
