//! Validation of caller-supplied prediction inputs

use serde_json::Value;
use thiserror::Error;

use crate::types::{FeatureRow, WeeklyAggregate, NUM_FEATURES};

// ============================================================================
// Weekly aggregates
// ============================================================================

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WeeklyInputError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing input features: {}", .0.join(", "))]
    MissingFeatures(Vec<&'static str>),

    #[error("feature '{0}' must be a number")]
    NotNumeric(&'static str),
}

/// Extract the four weekly features from a JSON body, reporting every
/// missing field at once
pub fn parse_weekly_aggregate(body: &Value) -> Result<WeeklyAggregate, WeeklyInputError> {
    let object = body.as_object().ok_or(WeeklyInputError::NotAnObject)?;

    let missing: Vec<&'static str> = WeeklyAggregate::FIELDS
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(WeeklyInputError::MissingFeatures(missing));
    }

    let mut values = [0.0; NUM_FEATURES];
    for (value, field) in values.iter_mut().zip(WeeklyAggregate::FIELDS) {
        *value = object[field]
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or(WeeklyInputError::NotNumeric(field))?;
    }
    let [mean_temperature, mean_humidity, total_rainfall_mm, infestation_index] = values;

    Ok(WeeklyAggregate {
        mean_temperature,
        mean_humidity,
        total_rainfall_mm,
        infestation_index,
    })
}

// ============================================================================
// Raw sequences
// ============================================================================

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("sequence must have shape [{}, {}], received [{}, {}]", .expected[0], .expected[1], .received[0], .received[1])]
pub struct SequenceShapeError {
    pub expected: [usize; 2],
    pub received: [usize; 2],
}

/// Check a `[steps][4]` sequence and convert it to feature rows
pub fn parse_sequence(sequence: &[Vec<f64>], steps: usize) -> Result<Vec<FeatureRow>, SequenceShapeError> {
    let width = sequence
        .iter()
        .map(Vec::len)
        .find(|len| *len != NUM_FEATURES)
        .unwrap_or_else(|| sequence.first().map_or(0, Vec::len));

    if sequence.len() != steps || width != NUM_FEATURES {
        return Err(SequenceShapeError {
            expected: [steps, NUM_FEATURES],
            received: [sequence.len(), width],
        });
    }

    Ok(sequence
        .iter()
        .map(|row| FeatureRow::new(row[0], row[1], row[2], row[3]))
        .collect())
}
