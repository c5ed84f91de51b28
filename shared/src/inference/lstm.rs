//! Stacked LSTM binary classifier
//!
//! Weights follow the Keras layout: `kernel` is `[input_dim][4 * units]`,
//! `recurrent_kernel` is `[units][4 * units]`, `bias` is `[4 * units]`, with
//! gates ordered input, forget, cell, output. Activation is tanh and the
//! recurrent activation is sigmoid. Dropout layers are inactive at inference
//! and carry no weights.

use ndarray::{s, Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::{sigmoid, InferenceError, SequenceBatch, SequenceClassifier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmLayerWeights {
    pub units: usize,
    pub kernel: Vec<Vec<f64>>,
    pub recurrent_kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseWeights {
    pub kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

/// On-disk description of an LSTM classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmClassifierSpec {
    pub sequence_length: usize,
    pub n_features: usize,
    pub lstm_layers: Vec<LstmLayerWeights>,
    pub dense: DenseWeights,
}

#[derive(Debug, Clone)]
struct LstmLayer {
    units: usize,
    kernel: Array2<f64>,
    recurrent_kernel: Array2<f64>,
    bias: Array1<f64>,
}

impl LstmLayer {
    /// Run the layer over `(steps, input_dim)` and return every hidden state
    /// as `(steps, units)`
    fn forward(&self, inputs: ArrayView2<'_, f64>) -> Array2<f64> {
        let units = self.units;
        let mut hidden = Array1::<f64>::zeros(units);
        let mut cell = Array1::<f64>::zeros(units);
        let mut outputs = Array2::<f64>::zeros((inputs.nrows(), units));

        for (x, mut output) in inputs.outer_iter().zip(outputs.outer_iter_mut()) {
            let z = x.dot(&self.kernel) + hidden.dot(&self.recurrent_kernel) + &self.bias;

            let input_gate = z.slice(s![..units]).mapv(sigmoid);
            let forget_gate = z.slice(s![units..2 * units]).mapv(sigmoid);
            let candidate = z.slice(s![2 * units..3 * units]).mapv(f64::tanh);
            let output_gate = z.slice(s![3 * units..]).mapv(sigmoid);

            cell = forget_gate * &cell + input_gate * candidate;
            hidden = output_gate * cell.mapv(f64::tanh);
            output.assign(&hidden);
        }

        outputs
    }
}

/// LSTM layers followed by a single sigmoid output unit
#[derive(Debug, Clone)]
pub struct LstmClassifier {
    sequence_length: usize,
    n_features: usize,
    layers: Vec<LstmLayer>,
    dense_kernel: Array1<f64>,
    dense_bias: f64,
}

fn to_matrix(
    name: &str,
    rows: Vec<Vec<f64>>,
    shape: (usize, usize),
) -> Result<Array2<f64>, InferenceError> {
    if rows.len() != shape.0 || rows.iter().any(|row| row.len() != shape.1) {
        return Err(InferenceError::InvalidWeights(format!(
            "{} must be {}x{}",
            name, shape.0, shape.1
        )));
    }
    let values: Vec<f64> = rows.into_iter().flatten().collect();
    check_finite(name, &values)?;
    Array2::from_shape_vec(shape, values)
        .map_err(|e| InferenceError::InvalidWeights(format!("{}: {}", name, e)))
}

fn to_vector(name: &str, values: Vec<f64>, len: usize) -> Result<Array1<f64>, InferenceError> {
    if values.len() != len {
        return Err(InferenceError::InvalidWeights(format!(
            "{} must have {} values",
            name, len
        )));
    }
    check_finite(name, &values)?;
    Ok(Array1::from(values))
}

fn check_finite(name: &str, values: &[f64]) -> Result<(), InferenceError> {
    if values.iter().any(|w| !w.is_finite()) {
        return Err(InferenceError::InvalidWeights(format!(
            "{} contains non-finite weights",
            name
        )));
    }
    Ok(())
}

impl TryFrom<LstmClassifierSpec> for LstmClassifier {
    type Error = InferenceError;

    fn try_from(spec: LstmClassifierSpec) -> Result<Self, Self::Error> {
        if spec.sequence_length == 0 || spec.n_features == 0 {
            return Err(InferenceError::InvalidWeights(
                "sequence_length and n_features must be positive".to_string(),
            ));
        }
        if spec.lstm_layers.is_empty() {
            return Err(InferenceError::InvalidWeights(
                "at least one LSTM layer is required".to_string(),
            ));
        }

        let mut layers = Vec::with_capacity(spec.lstm_layers.len());
        let mut input_dim = spec.n_features;
        for (i, layer) in spec.lstm_layers.into_iter().enumerate() {
            let units = layer.units;
            if units == 0 {
                return Err(InferenceError::InvalidWeights(format!(
                    "lstm_layers[{}] has no units",
                    i
                )));
            }

            layers.push(LstmLayer {
                units,
                kernel: to_matrix(
                    &format!("lstm_layers[{}].kernel", i),
                    layer.kernel,
                    (input_dim, 4 * units),
                )?,
                recurrent_kernel: to_matrix(
                    &format!("lstm_layers[{}].recurrent_kernel", i),
                    layer.recurrent_kernel,
                    (units, 4 * units),
                )?,
                bias: to_vector(&format!("lstm_layers[{}].bias", i), layer.bias, 4 * units)?,
            });
            input_dim = units;
        }

        let dense_kernel = to_matrix("dense.kernel", spec.dense.kernel, (input_dim, 1))?;
        let dense_bias = to_vector("dense.bias", spec.dense.bias, 1)?;

        Ok(Self {
            sequence_length: spec.sequence_length,
            n_features: spec.n_features,
            layers,
            dense_kernel: dense_kernel.column(0).to_owned(),
            dense_bias: dense_bias[0],
        })
    }
}

impl LstmClassifier {
    /// Hidden units of each LSTM layer, in order
    pub fn layer_units(&self) -> Vec<usize> {
        self.layers.iter().map(|layer| layer.units).collect()
    }

    fn predict_sample(&self, sample: ArrayView2<'_, f64>) -> f64 {
        let mut sequence = sample.to_owned();
        for layer in &self.layers {
            sequence = layer.forward(sequence.view());
        }

        // only the last hidden state feeds the dense layer
        let logit = match sequence.outer_iter().last() {
            Some(last) => last.dot(&self.dense_kernel) + self.dense_bias,
            None => self.dense_bias,
        };
        sigmoid(logit)
    }
}

impl SequenceClassifier for LstmClassifier {
    fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, batch: &SequenceBatch) -> Result<Vec<f64>, InferenceError> {
        self.check_shape(batch)?;

        batch
            .samples()
            .map(|sample| {
                let probability = self.predict_sample(sample);
                if probability.is_finite() {
                    Ok(probability)
                } else {
                    Err(InferenceError::NonFinite)
                }
            })
            .collect()
    }
}
