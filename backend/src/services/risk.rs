//! Model-based dengue risk for a neighborhood over a forecast horizon

use std::sync::Arc;

use shared::inference::SequenceBatch;
use shared::resampler::{build_daily_summary, build_sequence};
use shared::{RiskAssessment, RiskLevel};

use crate::artifacts::Artifacts;
use crate::error::{AppError, AppResult};
use crate::external::WeatherProvider;

/// Risk service running the per-request prediction pipeline
#[derive(Clone)]
pub struct RiskService<'a> {
    artifacts: &'a Artifacts,
    weather: Arc<dyn WeatherProvider>,
}

impl<'a> RiskService<'a> {
    pub fn new(artifacts: &'a Artifacts, weather: Arc<dyn WeatherProvider>) -> Self {
        Self { artifacts, weather }
    }

    /// Assess the outbreak risk of `neighborhood` for the horizon `days`
    ///
    /// Steps run strictly in order: horizon, neighborhood, forecast,
    /// sequence, normalization, inference, daily summary. No step is retried.
    pub async fn assess(&self, neighborhood: &str, days: Option<&str>) -> AppResult<RiskAssessment> {
        let days = days.ok_or(AppError::InvalidPeriod(None))?;
        let horizon_model = self.artifacts.horizons.resolve(days)?;
        let horizon = horizon_model.horizon;

        let record = self.artifacts.neighborhoods.lookup(neighborhood)?;
        let infestation_index = record.infestation_index.ok_or_else(|| {
            AppError::DataIntegrity(format!(
                "neighborhood '{}' has no infestation index",
                record.name
            ))
        })?;

        let forecast = self.weather.forecast().await?;

        let sequence = build_sequence(&forecast, horizon, infestation_index)
            .map_err(|e| AppError::insufficient_forecast(e, horizon.days()))?;
        let batch = SequenceBatch::from_matrix(self.artifacts.normalizer.transform(&sequence));

        let probability = horizon_model
            .model
            .predict_proba(&batch)?
            .first()
            .copied()
            .ok_or_else(|| AppError::Internal("model returned no prediction".to_string()))?;

        let level = RiskLevel::from_probability(probability);
        tracing::info!(
            neighborhood = %record.name,
            horizon = %horizon,
            probability,
            level = %level,
            "Risk assessed"
        );

        Ok(RiskAssessment {
            neighborhood: record.name.clone(),
            period: horizon.label(),
            probability,
            level,
            daily_forecast: build_daily_summary(&forecast, horizon.days()),
        })
    }
}
