//! Neighborhood lookup records

use serde::Serialize;
use serde_json::{Map, Value};

/// One row of the neighborhood lookup table
#[derive(Debug, Clone, Serialize)]
pub struct NeighborhoodRecord {
    /// Normalized (trimmed, uppercase) neighborhood name
    pub name: String,
    /// Larval infestation index (IIP, percent); `None` when the row lacks it
    pub infestation_index: Option<f64>,
    /// Every column of the row, keyed by header
    pub attributes: Map<String, Value>,
}

impl NeighborhoodRecord {
    pub fn new(name: &str, infestation_index: Option<f64>, attributes: Map<String, Value>) -> Self {
        Self {
            name: normalize_name(name),
            infestation_index,
            attributes,
        }
    }
}

/// Canonical lookup key for a neighborhood name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}
