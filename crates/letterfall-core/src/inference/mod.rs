// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Inference Weights
//!
//! Pre-trained weights for the dense control network, in their serialized
//! shape: an ordered list of tensors alternating weight matrix (one row per
//! output unit) and bias vector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One serialized tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerTensor {
    /// A weight matrix, `rows = outputs`, `columns = inputs`.
    Matrix(Vec<Vec<f32>>),
    /// A bias vector.
    Vector(Vec<f32>),
}

/// The raw tensor list `[W0, b0, W1, b1, ...]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightSet {
    /// Tensors in file order.
    pub tensors: Vec<LayerTensor>,
}

/// A validated dense layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    /// `weights[row][col]`, one row per output unit.
    pub weights: Vec<Vec<f32>>,
    /// One bias per output unit.
    pub bias: Vec<f32>,
}

impl DenseLayer {
    /// Number of inputs.
    pub fn inputs(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    /// Number of outputs.
    pub fn outputs(&self) -> usize {
        self.bias.len()
    }
}

impl WeightSet {
    /// Wraps a tensor list.
    pub fn new(tensors: Vec<LayerTensor>) -> Self {
        Self { tensors }
    }

    /// Checks the tensor list and pairs it into dense layers.
    ///
    /// The list must be non-empty and alternate matrix and vector. Every matrix
    /// is rectangular, has as many rows as its bias has entries, and as many
    /// columns as the previous layer has outputs.
    pub fn into_layers(self) -> Result<Vec<DenseLayer>, InferenceError> {
        if self.tensors.is_empty() {
            return Err(InferenceError::Empty);
        }
        if self.tensors.len() % 2 != 0 {
            return Err(InferenceError::OddTensorCount(self.tensors.len()));
        }

        let mut layers = Vec::with_capacity(self.tensors.len() / 2);
        let mut tensors = self.tensors.into_iter().enumerate();
        while let (Some((wi, weights)), Some((bi, bias))) = (tensors.next(), tensors.next()) {
            let layer = layers.len();
            let LayerTensor::Matrix(weights) = weights else {
                return Err(InferenceError::UnexpectedTensor {
                    index: wi,
                    expected: "matrix",
                });
            };
            let LayerTensor::Vector(bias) = bias else {
                return Err(InferenceError::UnexpectedTensor {
                    index: bi,
                    expected: "vector",
                });
            };

            let columns = weights.first().map_or(0, Vec::len);
            if columns == 0 || weights.iter().any(|row| row.len() != columns) {
                return Err(InferenceError::RaggedMatrix { layer });
            }
            if weights.len() != bias.len() {
                return Err(InferenceError::BiasMismatch {
                    layer,
                    rows: weights.len(),
                    bias: bias.len(),
                });
            }
            if let Some(previous) = layers.last().map(DenseLayer::outputs) {
                if previous != columns {
                    return Err(InferenceError::LayerMismatch {
                        layer,
                        expected: previous,
                        found: columns,
                    });
                }
            }
            layers.push(DenseLayer { weights, bias });
        }
        Ok(layers)
    }
}

/// Errors raised while validating weights or running the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// The weight list holds no tensor.
    Empty,
    /// Weights and biases do not pair up.
    OddTensorCount(usize),
    /// A tensor of the wrong kind at the given position.
    UnexpectedTensor {
        /// Position in the tensor list.
        index: usize,
        /// What should have been there.
        expected: &'static str,
    },
    /// A matrix is empty or its rows differ in length.
    RaggedMatrix {
        /// Layer index.
        layer: usize,
    },
    /// Matrix row count and bias length differ.
    BiasMismatch {
        /// Layer index.
        layer: usize,
        /// Matrix rows.
        rows: usize,
        /// Bias entries.
        bias: usize,
    },
    /// A layer's input width does not match the previous layer's output.
    LayerMismatch {
        /// Layer index.
        layer: usize,
        /// Outputs of the previous layer.
        expected: usize,
        /// Columns of this layer.
        found: usize,
    },
    /// The network does not map 4 observations to at least 2 actions.
    PolicyShape {
        /// Network input width.
        inputs: usize,
        /// Network output width.
        outputs: usize,
    },
    /// An observation of the wrong length reached the network.
    InputMismatch {
        /// Network input width.
        expected: usize,
        /// Observation length.
        found: usize,
    },
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceError::Empty => write!(f, "Weight set is empty"),
            InferenceError::OddTensorCount(n) => {
                write!(f, "Weight set has {n} tensors, expected weight/bias pairs")
            }
            InferenceError::UnexpectedTensor { index, expected } => {
                write!(f, "Tensor {index} should be a {expected}")
            }
            InferenceError::RaggedMatrix { layer } => {
                write!(f, "Layer {layer} has an empty or ragged weight matrix")
            }
            InferenceError::BiasMismatch { layer, rows, bias } => write!(
                f,
                "Layer {layer} has {rows} weight rows but {bias} bias entries"
            ),
            InferenceError::LayerMismatch {
                layer,
                expected,
                found,
            } => write!(
                f,
                "Layer {layer} takes {found} inputs but the previous layer emits {expected}"
            ),
            InferenceError::PolicyShape { inputs, outputs } => write!(
                f,
                "Policy network maps {inputs} inputs to {outputs} outputs, expected 4 to at least 2"
            ),
            InferenceError::InputMismatch { expected, found } => write!(
                f,
                "Observation has {found} values but the network expects {expected}"
            ),
        }
    }
}

impl std::error::Error for InferenceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_untagged_json() {
        let set: WeightSet = serde_json::from_str("[[[1.0, 2.0]], [0.5]]").unwrap();
        let layers = set.into_layers().unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].inputs(), 2);
        assert_eq!(layers[0].outputs(), 1);
    }

    #[test]
    fn rejects_misordered_tensors() {
        let set = WeightSet::new(vec![
            LayerTensor::Vector(vec![1.0]),
            LayerTensor::Matrix(vec![vec![1.0]]),
        ]);
        assert_eq!(
            set.into_layers(),
            Err(InferenceError::UnexpectedTensor {
                index: 0,
                expected: "matrix"
            })
        );
    }

    #[test]
    fn rejects_chain_mismatch() {
        let set = WeightSet::new(vec![
            LayerTensor::Matrix(vec![vec![1.0; 4]; 3]),
            LayerTensor::Vector(vec![0.0; 3]),
            LayerTensor::Matrix(vec![vec![1.0; 2]; 2]),
            LayerTensor::Vector(vec![0.0; 2]),
        ]);
        assert_eq!(
            set.into_layers(),
            Err(InferenceError::LayerMismatch {
                layer: 1,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn rejects_bias_mismatch_and_ragged_rows() {
        let bias = WeightSet::new(vec![
            LayerTensor::Matrix(vec![vec![1.0, 1.0]; 2]),
            LayerTensor::Vector(vec![0.0]),
        ]);
        assert!(matches!(
            bias.into_layers(),
            Err(InferenceError::BiasMismatch { .. })
        ));

        let ragged = WeightSet::new(vec![
            LayerTensor::Matrix(vec![vec![1.0, 1.0], vec![1.0]]),
            LayerTensor::Vector(vec![0.0, 0.0]),
        ]);
        assert_eq!(
            ragged.into_layers(),
            Err(InferenceError::RaggedMatrix { layer: 0 })
        );
    }

    #[test]
    fn rejects_empty_and_odd() {
        assert_eq!(WeightSet::default().into_layers(), Err(InferenceError::Empty));
        let odd = WeightSet::new(vec![LayerTensor::Matrix(vec![vec![1.0]])]);
        assert_eq!(odd.into_layers(), Err(InferenceError::OddTensorCount(1)));
    }
}
