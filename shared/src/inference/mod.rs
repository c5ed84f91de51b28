//! Inference over persisted model weights
//!
//! Models are trained offline and exported as JSON weight files. This module
//! only runs the forward pass.

mod forest;
mod lstm;

pub use forest::*;
pub use lstm::*;

use ndarray::{Array2, Array3, ArrayView2, Axis};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum InferenceError {
    #[error("input shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("invalid model weights: {0}")]
    InvalidWeights(String),

    #[error("model produced a non-finite output")]
    NonFinite,
}

/// `(batch, steps, features)` input tensor
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceBatch {
    values: Array3<f64>,
}

impl SequenceBatch {
    /// A single-sample batch `(1, steps, features)` from a `(steps, features)` matrix
    pub fn from_matrix(sample: Array2<f64>) -> Self {
        Self {
            values: sample.insert_axis(Axis(0)),
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        let (batch, steps, features) = self.values.dim();
        [batch, steps, features]
    }

    pub fn batch_size(&self) -> usize {
        self.values.len_of(Axis(0))
    }

    /// Each sample as a `(steps, features)` view
    pub fn samples(&self) -> impl Iterator<Item = ArrayView2<'_, f64>> {
        self.values.outer_iter()
    }
}

/// Binary classifier over fixed-length feature sequences
pub trait SequenceClassifier: Send + Sync {
    /// Number of time steps the model expects
    fn sequence_length(&self) -> usize;

    /// Number of features per time step
    fn n_features(&self) -> usize;

    /// Positive-class probability for each sample of the batch
    fn predict_proba(&self, batch: &SequenceBatch) -> Result<Vec<f64>, InferenceError>;

    /// Reject batches that do not match the model's input shape
    fn check_shape(&self, batch: &SequenceBatch) -> Result<(), InferenceError> {
        let [batch_size, steps, features] = batch.shape();
        if steps != self.sequence_length() || features != self.n_features() {
            return Err(InferenceError::ShapeMismatch {
                expected: vec![batch_size, self.sequence_length(), self.n_features()],
                actual: vec![batch_size, steps, features],
            });
        }
        Ok(())
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureRow;

    #[test]
    fn test_from_matrix_shape() {
        let rows = vec![FeatureRow::new(1.0, 2.0, 3.0, 4.0); 8];
        let batch = SequenceBatch::from_matrix(FeatureRow::matrix(&rows));
        assert_eq!(batch.shape(), [1, 8, 4]);
        assert_eq!(batch.batch_size(), 1);

        let sample = batch.samples().next().unwrap();
        assert_eq!(sample.nrows(), 8);
        assert_eq!(sample.row(3).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.9999);
        assert!(sigmoid(-10.0) < 0.0001);
    }
}
