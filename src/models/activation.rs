//! Activation functions for the dense layers
//!
//! Implements the activations used by the fraud network and their
//! derivatives for backpropagation.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Types of activation functions available
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivationType {
    /// Rectified Linear Unit: max(0, x)
    ReLU,
    /// Sigmoid: 1 / (1 + exp(-x))
    Sigmoid,
}

/// Activation function with forward and backward passes over a batch
pub trait Activation {
    /// Apply the activation function
    fn forward_batch(&self, x: &Array2<f64>) -> Array2<f64>;

    /// Derivative with respect to the pre-activation input
    fn backward_batch(&self, x: &Array2<f64>) -> Array2<f64>;
}

/// ReLU activation function
pub struct ReLU;

impl Activation for ReLU {
    fn forward_batch(&self, x: &Array2<f64>) -> Array2<f64> {
        x.mapv(|v| v.max(0.0))
    }

    fn backward_batch(&self, x: &Array2<f64>) -> Array2<f64> {
        x.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
    }
}

/// Sigmoid activation function
pub struct Sigmoid;

impl Activation for Sigmoid {
    fn forward_batch(&self, x: &Array2<f64>) -> Array2<f64> {
        x.mapv(sigmoid)
    }

    fn backward_batch(&self, x: &Array2<f64>) -> Array2<f64> {
        let s = self.forward_batch(x);
        &s * &(1.0 - &s)
    }
}

/// Logistic function, stable for large negative inputs
pub fn sigmoid(v: f64) -> f64 {
    if v >= 0.0 {
        1.0 / (1.0 + (-v).exp())
    } else {
        let e = v.exp();
        e / (1.0 + e)
    }
}

/// Create an activation function from type
pub fn create_activation(activation_type: ActivationType) -> Box<dyn Activation> {
    match activation_type {
        ActivationType::ReLU => Box::new(ReLU),
        ActivationType::Sigmoid => Box::new(Sigmoid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_relu() {
        let x = Array2::from_shape_vec((1, 4), vec![-1.0, 0.0, 1.0, 2.0]).unwrap();
        assert_eq!(
            ReLU.forward_batch(&x),
            Array2::from_shape_vec((1, 4), vec![0.0, 0.0, 1.0, 2.0]).unwrap()
        );
        assert_eq!(
            ReLU.backward_batch(&x),
            Array2::from_shape_vec((1, 4), vec![0.0, 0.0, 1.0, 1.0]).unwrap()
        );
    }

    #[test]
    fn test_sigmoid() {
        assert_relative_eq!(sigmoid(0.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(sigmoid(-800.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(sigmoid(800.0), 1.0, epsilon = 1e-12);

        let x = Array2::zeros((1, 1));
        assert_relative_eq!(Sigmoid.backward_batch(&x)[[0, 0]], 0.25, epsilon = 1e-12);
    }
}
