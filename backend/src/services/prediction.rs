//! Direct outbreak predictions from caller-supplied features

use serde_json::Value;
use shared::inference::{SequenceBatch, SequenceClassifier};
use shared::validation::{parse_sequence, parse_weekly_aggregate};
use shared::OutbreakPrediction;

use crate::artifacts::Artifacts;
use crate::error::{AppError, AppResult};

pub const RANDOM_FOREST_LABEL: &str = "Random Forest";

pub struct PredictionService<'a> {
    artifacts: &'a Artifacts,
}

impl<'a> PredictionService<'a> {
    pub fn new(artifacts: &'a Artifacts) -> Self {
        Self { artifacts }
    }

    /// Random Forest over one week of aggregated weather and the
    /// neighborhood infestation index
    pub fn predict_weekly(&self, body: &Value) -> AppResult<OutbreakPrediction> {
        let forest = self
            .artifacts
            .forest
            .as_ref()
            .ok_or(AppError::ModelNotLoaded(RANDOM_FOREST_LABEL))?;

        let aggregate = parse_weekly_aggregate(body)?;
        let probability = forest.predict_proba(&aggregate.to_array())?;

        tracing::info!(probability, "Random Forest prediction");
        Ok(OutbreakPrediction::new(Some(RANDOM_FOREST_LABEL), probability))
    }

    /// Raw-sequence LSTM over a caller-built `[steps][4]` sequence
    pub fn predict_sequence(&self, sequence: &[Vec<f64>]) -> AppResult<OutbreakPrediction> {
        let raw = self
            .artifacts
            .raw_sequence
            .as_ref()
            .ok_or(AppError::ModelNotLoaded("LSTM"))?;

        let rows = parse_sequence(sequence, raw.model.sequence_length())?;
        let batch = SequenceBatch::from_matrix(raw.normalizer.transform(&rows));

        let probability = raw
            .model
            .predict_proba(&batch)?
            .first()
            .copied()
            .ok_or_else(|| AppError::Internal("model returned no prediction".to_string()))?;

        tracing::info!(probability, "Raw-sequence LSTM prediction");
        Ok(OutbreakPrediction::new(None, probability))
    }
}
