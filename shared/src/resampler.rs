//! Forecast resampling
//!
//! Turns the provider's flat list of 3-hour forecast steps into the two
//! shapes the service needs: a fixed-length feature sequence for a horizon
//! model, and a per-day summary for display.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{DailySummary, ForecastStep, Horizon};
use crate::types::FeatureRow;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResampleError {
    #[error("forecast has {available} steps but {required} are required")]
    InsufficientData { available: usize, required: usize },
}

/// Build the model input sequence for `horizon` from the first
/// `sequence_length` forecast steps.
///
/// The provider delivers steps at fixed 3-hour spacing starting from now, so
/// the leading steps are exactly the window the model was trained on. Fewer
/// steps than required is an error; the sequence is never padded.
pub fn build_sequence(
    steps: &[ForecastStep],
    horizon: Horizon,
    infestation_index: f64,
) -> Result<Vec<FeatureRow>, ResampleError> {
    let required = horizon.sequence_length();
    if steps.len() < required {
        return Err(ResampleError::InsufficientData {
            available: steps.len(),
            required,
        });
    }

    Ok(steps[..required]
        .iter()
        .map(|step| {
            FeatureRow::new(
                step.temperature_celsius,
                step.humidity_percent,
                step.rain_3h_mm,
                infestation_index,
            )
        })
        .collect())
}

struct DayAccumulator {
    date: NaiveDate,
    min_celsius: f64,
    max_celsius: f64,
    max_pop: f64,
    // insertion ordered; ties resolve to the earliest description
    descriptions: Vec<(String, usize)>,
}

impl DayAccumulator {
    fn new(step: &ForecastStep) -> Self {
        Self {
            date: step.date(),
            min_celsius: step.temp_min_celsius,
            max_celsius: step.temp_max_celsius,
            max_pop: step.pop,
            descriptions: Vec::new(),
        }
    }

    fn add(&mut self, step: &ForecastStep) {
        self.min_celsius = self.min_celsius.min(step.temp_min_celsius);
        self.max_celsius = self.max_celsius.max(step.temp_max_celsius);
        self.max_pop = self.max_pop.max(step.pop);

        match self
            .descriptions
            .iter_mut()
            .find(|(desc, _)| *desc == step.weather_description)
        {
            Some((_, count)) => *count += 1,
            None => self
                .descriptions
                .push((step.weather_description.clone(), 1)),
        }
    }

    fn dominant_description(&self) -> String {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.descriptions {
            if best.map_or(true, |(_, count)| entry.1 > *count) {
                best = Some(entry);
            }
        }
        best.map(|(desc, _)| desc.clone()).unwrap_or_default()
    }

    fn finish(self) -> DailySummary {
        let rain_pct = Decimal::from_f64(self.max_pop * 100.0)
            .unwrap_or_default()
            .round_dp(2);

        DailySummary {
            date: self.date,
            min_celsius: Decimal::from_f64(self.min_celsius).unwrap_or_default(),
            max_celsius: Decimal::from_f64(self.max_celsius).unwrap_or_default(),
            rain_probability_pct: rain_pct,
            conditions: self.dominant_description(),
        }
    }
}

/// Summarize forecast steps per calendar day and keep the first `num_days`
/// days, in the order they appear in the forecast.
pub fn build_daily_summary(steps: &[ForecastStep], num_days: usize) -> Vec<DailySummary> {
    let mut days: Vec<DayAccumulator> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for step in steps {
        let position = *index.entry(step.date()).or_insert_with(|| {
            days.push(DayAccumulator::new(step));
            days.len() - 1
        });
        days[position].add(step);
    }

    days.into_iter()
        .take(num_days)
        .map(DayAccumulator::finish)
        .collect()
}
