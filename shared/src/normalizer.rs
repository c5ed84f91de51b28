//! Min-max feature normalization
//!
//! The parameters are fitted offline on the training data and loaded from
//! disk. They cover all four feature columns jointly and are never refitted
//! at inference time.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{FeatureRow, NUM_FEATURES};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NormalizerError {
    #[error("expected {expected} columns, found {found} in {field}")]
    ColumnCount {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("feature range ({0}, {1}) must be finite and increasing")]
    InvalidFeatureRange(f64, f64),

    #[error("column {column} has non-finite or inverted bounds ({min}, {max})")]
    InvalidBounds { column: usize, min: f64, max: f64 },
}

/// Persisted normalizer state, named after scikit-learn's MinMaxScaler
/// attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerParams {
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Fitted per-column min-max scaler over [`FeatureRow`] columns
///
/// `x' = x * scale + offset`, broadcast over every row of the input matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxNormalizer {
    scale: Array1<f64>,
    offset: Array1<f64>,
}

impl MinMaxNormalizer {
    /// Build a normalizer from persisted parameters
    pub fn from_params(params: NormalizerParams) -> Result<Self, NormalizerError> {
        let (lo, hi) = params.feature_range;
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(NormalizerError::InvalidFeatureRange(lo, hi));
        }
        for (field, values) in [("data_min", &params.data_min), ("data_max", &params.data_max)] {
            if values.len() != NUM_FEATURES {
                return Err(NormalizerError::ColumnCount {
                    field,
                    expected: NUM_FEATURES,
                    found: values.len(),
                });
            }
        }

        let mut scale = Array1::ones(NUM_FEATURES);
        let mut offset = Array1::zeros(NUM_FEATURES);
        for column in 0..NUM_FEATURES {
            let (min, max) = (params.data_min[column], params.data_max[column]);
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(NormalizerError::InvalidBounds { column, min, max });
            }
            // a constant column divides by 1 instead of 0
            let range = if max - min == 0.0 { 1.0 } else { max - min };
            scale[column] = (hi - lo) / range;
            offset[column] = lo - min * scale[column];
        }

        Ok(Self { scale, offset })
    }

    /// Scale every row into an `(n, 4)` matrix; values outside the fitted
    /// bounds are not clipped
    pub fn transform(&self, rows: &[FeatureRow]) -> Array2<f64> {
        FeatureRow::matrix(rows) * &self.scale + &self.offset
    }

    /// Map a normalized `(n, 4)` matrix back to feature units
    pub fn inverse_transform(
        &self,
        normalized: &Array2<f64>,
    ) -> Result<Array2<f64>, NormalizerError> {
        if normalized.ncols() != NUM_FEATURES {
            return Err(NormalizerError::ColumnCount {
                field: "normalized",
                expected: NUM_FEATURES,
                found: normalized.ncols(),
            });
        }
        Ok((normalized - &self.offset) / &self.scale)
    }
}
