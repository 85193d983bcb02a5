//! Dense (fully connected) layer with optional dropout
//!
//! A dense layer computes `output = activation(input · weights + bias)`.
//! During training the activations are passed through inverted dropout.

use ndarray::{Array1, Array2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::activation::{create_activation, ActivationType};

/// Dense layer with weights, biases, activation and dropout rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Weight matrix (input_size x output_size)
    pub weights: Array2<f64>,
    /// Bias vector (output_size)
    pub biases: Array1<f64>,
    pub activation_type: ActivationType,
    pub input_size: usize,
    pub output_size: usize,
    /// Fraction of activations zeroed during training (0.0 = no dropout)
    pub dropout_rate: f64,
}

/// Values kept from a training forward pass for backpropagation
#[derive(Debug, Clone)]
pub struct ForwardCache {
    input: Array2<f64>,
    z: Array2<f64>,
    dropout_mask: Option<Array2<f64>>,
}

/// Gradients produced by one layer's backward pass
#[derive(Debug, Clone)]
pub struct LayerGradients {
    /// Gradient with respect to the layer input (for the previous layer)
    pub input: Array2<f64>,
    pub weights: Array2<f64>,
    pub biases: Array1<f64>,
}

impl DenseLayer {
    /// Create a layer with Glorot-uniform weights and zero biases
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: ActivationType,
        rng: &mut R,
    ) -> Self {
        let limit = (6.0 / (input_size + output_size) as f64).sqrt();
        let weights = Array2::random_using(
            (input_size, output_size),
            Uniform::new(-limit, limit),
            rng,
        );

        Self {
            weights,
            biases: Array1::zeros(output_size),
            activation_type: activation,
            input_size,
            output_size,
            dropout_rate: 0.0,
        }
    }

    /// Create layer with specific dropout rate
    pub fn with_dropout(mut self, rate: f64) -> Self {
        self.dropout_rate = rate.clamp(0.0, 0.99);
        self
    }

    fn linear(&self, input: &Array2<f64>) -> Array2<f64> {
        input.dot(&self.weights) + &self.biases
    }

    /// Inference forward pass; dropout is disabled.
    pub fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        let z = self.linear(input);
        create_activation(self.activation_type).forward_batch(&z)
    }

    /// Training forward pass with dropout, returning what backward needs.
    pub fn forward_train<R: Rng + ?Sized>(
        &self,
        input: &Array2<f64>,
        rng: &mut R,
    ) -> (Array2<f64>, ForwardCache) {
        let z = self.linear(input);
        let mut output = create_activation(self.activation_type).forward_batch(&z);

        let dropout_mask = if self.dropout_rate > 0.0 {
            let keep_scale = 1.0 / (1.0 - self.dropout_rate);
            let mask = Array2::from_shape_fn(output.dim(), |_| {
                if rng.gen::<f64>() >= self.dropout_rate {
                    keep_scale
                } else {
                    0.0
                }
            });
            output = &output * &mask;
            Some(mask)
        } else {
            None
        };

        let cache = ForwardCache {
            input: input.clone(),
            z,
            dropout_mask,
        };
        (output, cache)
    }

    /// Backward pass from the gradient of the loss with respect to the output
    pub fn backward(&self, cache: &ForwardCache, output_gradient: &Array2<f64>) -> LayerGradients {
        let grad = match &cache.dropout_mask {
            Some(mask) => output_gradient * mask,
            None => output_gradient.clone(),
        };

        let activation_grad = create_activation(self.activation_type).backward_batch(&cache.z);
        self.backward_delta(cache, &(&grad * &activation_grad))
    }

    /// Backward pass from the gradient with respect to the pre-activation `z`.
    ///
    /// Used by the output layer, where sigmoid and cross-entropy combine into
    /// `p - y`.
    pub fn backward_delta(&self, cache: &ForwardCache, delta: &Array2<f64>) -> LayerGradients {
        LayerGradients {
            input: delta.dot(&self.weights.t()),
            weights: cache.input.t().dot(delta),
            biases: delta.sum_axis(Axis(0)),
        }
    }

    /// Get number of parameters
    pub fn num_parameters(&self) -> usize {
        self.weights.len() + self.biases.len()
    }
}
