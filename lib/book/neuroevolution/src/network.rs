/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::{Controller, Float, Rng};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("layer {0} has no neurons")]
    EmptyLayer(usize),

    #[error("layer {layer} expects {expected} weights per neuron, got {actual}")]
    WeightShape {
        layer: usize,
        expected: usize,
        actual: usize,
    },

    #[error("layer {layer} has {neurons} neurons but {biases} biases")]
    BiasShape {
        layer: usize,
        neurons: usize,
        biases: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Tanh,
    Sigmoid,
    Relu,
    Identity,
}

impl Activation {
    pub fn apply(self, x: Float) -> Float {
        match self {
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Relu => x.max(0.0),
            Activation::Identity => x,
        }
    }
}

/// Layer sizes of a fully connected feed-forward network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topology {
    pub inputs: usize,
    pub hidden: Vec<usize>,
    pub outputs: usize,
    pub activation: Activation,
}

impl Default for Topology {
    // bird y, distance to the top pipe, distance to the bottom pipe -> jump?
    fn default() -> Self {
        Self {
            inputs: 3,
            hidden: Vec::new(),
            outputs: 1,
            activation: Activation::Tanh,
        }
    }
}

impl Topology {
    /// Sizes of every layer including the input layer.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden.len() + 2);
        sizes.push(self.inputs);
        sizes.extend(self.hidden.iter().copied());
        sizes.push(self.outputs);
        sizes
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        match self.layer_sizes().iter().position(|&size| size == 0) {
            Some(index) => Err(NetworkError::EmptyLayer(index)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Layer {
    // One row per neuron, one column per input.
    weights: Vec<Vec<Float>>,
    biases: Vec<Float>,
}

impl Layer {
    fn random(inputs: usize, neurons: usize, rng: &mut Rng) -> Self {
        let weights = (0..neurons)
            .map(|_| (0..inputs).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .collect();
        let biases = (0..neurons).map(|_| rng.gen_range(-1.0..1.0)).collect();
        Self { weights, biases }
    }

    fn forward(&self, inputs: &[Float], activation: Activation) -> Vec<Float> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                let sum: Float = row.iter().zip(inputs).map(|(w, x)| w * x).sum();
                activation.apply(sum + bias)
            })
            .collect()
    }
}

/// Fully connected network without recurrence. The activation is applied at every layer,
/// including the output layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedForwardNetwork {
    layers: Vec<Layer>,
    activation: Activation,
}

impl FeedForwardNetwork {
    /// Random weights and biases in [-1, 1).
    pub fn random(topology: &Topology, rng: &mut Rng) -> Self {
        let sizes = topology.layer_sizes();
        let layers = sizes
            .windows(2)
            .map(|pair| Layer::random(pair[0], pair[1], rng))
            .collect();
        Self {
            layers,
            activation: topology.activation,
        }
    }

    /// Build a network from explicit `(weights, biases)` per layer, input side first.
    pub fn from_layers(
        inputs: usize,
        layers: Vec<(Vec<Vec<Float>>, Vec<Float>)>,
        activation: Activation,
    ) -> Result<Self, NetworkError> {
        let mut expected_inputs = inputs;
        let mut built = Vec::with_capacity(layers.len());
        for (index, (weights, biases)) in layers.into_iter().enumerate() {
            if weights.is_empty() {
                return Err(NetworkError::EmptyLayer(index + 1));
            }
            if let Some(row) = weights.iter().find(|row| row.len() != expected_inputs) {
                return Err(NetworkError::WeightShape {
                    layer: index + 1,
                    expected: expected_inputs,
                    actual: row.len(),
                });
            }
            if biases.len() != weights.len() {
                return Err(NetworkError::BiasShape {
                    layer: index + 1,
                    neurons: weights.len(),
                    biases: biases.len(),
                });
            }
            expected_inputs = weights.len();
            built.push(Layer { weights, biases });
        }
        Ok(Self {
            layers: built,
            activation,
        })
    }

    pub fn inputs(&self) -> usize {
        self.layers
            .first()
            .and_then(|layer| layer.weights.first())
            .map_or(0, Vec::len)
    }

    pub fn outputs(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.biases.len())
    }
}

impl Controller for FeedForwardNetwork {
    fn activate(&mut self, inputs: &[Float]) -> Vec<Float> {
        debug_assert_eq!(inputs.len(), self.inputs());
        let mut values = inputs.to_vec();
        for layer in &self.layers {
            values = layer.forward(&values, self.activation);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;

    use super::*;
    use crate::Rng;

    #[test]
    fn test_default_topology_is_three_to_one() {
        let topology = Topology::default();
        assert_eq!(topology.layer_sizes(), vec![3, 1]);
        assert_eq!(topology.validate(), Ok(()));
    }

    #[test]
    fn test_empty_hidden_layer_is_rejected() {
        let topology = Topology {
            hidden: vec![4, 0],
            ..Topology::default()
        };
        assert_eq!(topology.validate(), Err(NetworkError::EmptyLayer(2)));
    }

    #[test]
    fn test_single_layer_tanh() {
        let mut network = FeedForwardNetwork::from_layers(
            3,
            vec![(vec![vec![0.5, -1.0, 0.25]], vec![0.1])],
            Activation::Tanh,
        )
        .expect("valid layers");
        let output = network.activate(&[1.0, 2.0, 4.0]);
        assert_eq!(output.len(), 1);
        // 0.5 - 2.0 + 1.0 + 0.1 = -0.4
        assert_abs_diff_eq!(output[0], (-0.4f64).tanh(), epsilon = 1e-12);
    }

    #[test]
    fn test_hidden_layer_feeds_output() {
        let mut network = FeedForwardNetwork::from_layers(
            2,
            vec![
                (vec![vec![1.0, 1.0], vec![1.0, -1.0]], vec![0.0, 0.0]),
                (vec![vec![2.0, 3.0]], vec![-1.0]),
            ],
            Activation::Relu,
        )
        .expect("valid layers");
        // hidden = [relu(5), relu(-1)] = [5, 0]; output = relu(10 + 0 - 1) = 9
        assert_eq!(network.activate(&[2.0, 3.0]), vec![9.0]);
    }

    #[test]
    fn test_mismatched_weights_are_rejected() {
        let result = FeedForwardNetwork::from_layers(
            3,
            vec![(vec![vec![1.0, 1.0]], vec![0.0])],
            Activation::Identity,
        );
        assert_eq!(
            result,
            Err(NetworkError::WeightShape {
                layer: 1,
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_mismatched_biases_are_rejected() {
        let result = FeedForwardNetwork::from_layers(
            1,
            vec![(vec![vec![1.0], vec![1.0]], vec![0.0])],
            Activation::Identity,
        );
        assert_eq!(
            result,
            Err(NetworkError::BiasShape {
                layer: 1,
                neurons: 2,
                biases: 1
            })
        );
    }

    #[test]
    fn test_activations() {
        assert_abs_diff_eq!(Activation::Sigmoid.apply(0.0), 0.5);
        assert_eq!(Activation::Relu.apply(-3.0), 0.0);
        assert_eq!(Activation::Identity.apply(-3.0), -3.0);
        assert_abs_diff_eq!(Activation::Tanh.apply(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn test_random_tanh_network_outputs_are_bounded(
            seed in any::<u64>(),
            y in -100.0..900.0f64,
            top in 0.0..1500.0f64,
            bottom in 0.0..1500.0f64,
        ) {
            let mut rng = Rng::seed_from_u64(seed);
            let topology = Topology {
                hidden: vec![4],
                ..Topology::default()
            };
            let mut network = FeedForwardNetwork::random(&topology, &mut rng);
            prop_assert_eq!(network.inputs(), 3);
            prop_assert_eq!(network.outputs(), 1);
            let output = network.activate(&[y, top, bottom]);
            prop_assert_eq!(output.len(), 1);
            prop_assert!(output[0] >= -1.0 && output[0] <= 1.0);
        }
    }
}
