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

//! Inference Lane
//!
//! A small fully connected network evaluated on the CPU. Hidden layers use
//! `tanh`; the output layer is left linear.

use letterfall_core::inference::{DenseLayer, InferenceError, WeightSet};

/// Number of values in a control observation.
pub const POLICY_INPUTS: usize = 4;

/// Minimum number of values in a control action.
pub const POLICY_OUTPUTS: usize = 2;

/// A validated, immutable feed-forward network.
#[derive(Debug, Clone, PartialEq)]
pub struct Brain {
    layers: Vec<DenseLayer>,
}

impl Brain {
    /// Builds a network from raw weights, rejecting any inconsistent shape.
    pub fn new(weights: WeightSet) -> Result<Self, InferenceError> {
        Ok(Self {
            layers: weights.into_layers()?,
        })
    }

    /// Builds a network usable as the control policy: 4 inputs, at least 2 outputs.
    pub fn for_policy(weights: WeightSet) -> Result<Self, InferenceError> {
        let brain = Self::new(weights)?;
        if brain.input_size() != POLICY_INPUTS || brain.output_size() < POLICY_OUTPUTS {
            return Err(InferenceError::PolicyShape {
                inputs: brain.input_size(),
                outputs: brain.output_size(),
            });
        }
        Ok(brain)
    }

    /// Width of the input layer.
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::inputs)
    }

    /// Width of the output layer.
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::outputs)
    }

    /// Number of dense layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Runs one forward pass. No state is kept between calls.
    pub fn predict(&self, observation: &[f32]) -> Result<Vec<f32>, InferenceError> {
        if observation.len() != self.input_size() {
            return Err(InferenceError::InputMismatch {
                expected: self.input_size(),
                found: observation.len(),
            });
        }

        let last = self.layers.len() - 1;
        let mut activations = observation.to_vec();
        for (index, layer) in self.layers.iter().enumerate() {
            let mut next: Vec<f32> = layer
                .weights
                .iter()
                .zip(&layer.bias)
                .map(|(row, bias)| {
                    bias + row
                        .iter()
                        .zip(&activations)
                        .map(|(w, x)| w * x)
                        .sum::<f32>()
                })
                .collect();
            if index != last {
                next.iter_mut().for_each(|v| *v = v.tanh());
            }
            activations = next;
        }
        Ok(activations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use letterfall_core::inference::LayerTensor;

    fn layer(weights: Vec<Vec<f32>>, bias: Vec<f32>) -> [LayerTensor; 2] {
        [LayerTensor::Matrix(weights), LayerTensor::Vector(bias)]
    }

    #[test]
    fn zero_input_returns_bias_for_single_layer() {
        let tensors = layer(vec![vec![0.3, -1.2, 4.0]; 2], vec![0.25, -7.5]).to_vec();
        let brain = Brain::new(WeightSet::new(tensors)).unwrap();
        assert_eq!(brain.predict(&[0.0, 0.0, 0.0]).unwrap(), vec![0.25, -7.5]);
    }

    #[test]
    fn hidden_layers_are_squashed_and_output_is_linear() {
        let mut tensors = layer(vec![vec![10.0]], vec![0.0]).to_vec();
        tensors.extend(layer(vec![vec![5.0]], vec![1.0]));
        let brain = Brain::new(WeightSet::new(tensors)).unwrap();

        let out = brain.predict(&[1.0]).unwrap();
        // tanh(10) is within f32 precision of 1, then 5 * 1 + 1 stays unbounded.
        assert_relative_eq!(out[0], 6.0, epsilon = 1e-4);
        assert_eq!(brain.depth(), 2);
    }

    #[test]
    fn wrong_observation_length_is_an_error() {
        let brain = Brain::new(WeightSet::new(layer(vec![vec![1.0; 4]; 2], vec![0.0; 2]).to_vec()))
            .unwrap();
        assert_eq!(
            brain.predict(&[1.0, 2.0, 3.0]),
            Err(InferenceError::InputMismatch {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn policy_requires_four_inputs_and_two_outputs() {
        let narrow = WeightSet::new(layer(vec![vec![1.0; 4]], vec![0.0]).to_vec());
        assert_eq!(
            Brain::for_policy(narrow),
            Err(InferenceError::PolicyShape {
                inputs: 4,
                outputs: 1
            })
        );

        let ok = WeightSet::new(layer(vec![vec![1.0; 4]; 3], vec![0.0; 3]).to_vec());
        let brain = Brain::for_policy(ok).unwrap();
        assert_eq!(brain.output_size(), 3);
    }
}
