//! Adam optimizer (Adaptive Moment Estimation)
//!
//! One instance is kept per layer; moment estimates are created lazily from
//! the first gradient they see.

use ndarray::{Array1, Array2};

use super::layer::{DenseLayer, LayerGradients};

/// Per-layer Adam state
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: i32,
    m_w: Option<Array2<f64>>,
    v_w: Option<Array2<f64>>,
    m_b: Option<Array1<f64>>,
    v_b: Option<Array1<f64>>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            t: 0,
            m_w: None,
            v_w: None,
            m_b: None,
            v_b: None,
        }
    }

    /// Apply one update step to a layer's weights and biases
    pub fn step(&mut self, layer: &mut DenseLayer, gradients: &LayerGradients) {
        self.t += 1;
        let correction1 = 1.0 - self.beta1.powi(self.t);
        let correction2 = 1.0 - self.beta2.powi(self.t);

        let m = self.m_w.get_or_insert_with(|| Array2::zeros(layer.weights.dim()));
        let v = self.v_w.get_or_insert_with(|| Array2::zeros(layer.weights.dim()));
        *m = &*m * self.beta1 + &gradients.weights * (1.0 - self.beta1);
        *v = &*v * self.beta2 + &(&gradients.weights * &gradients.weights) * (1.0 - self.beta2);
        let m_hat = &*m / correction1;
        let v_hat = &*v / correction2;
        layer.weights -= &(m_hat * self.learning_rate / (v_hat.mapv(f64::sqrt) + self.epsilon));

        let m = self.m_b.get_or_insert_with(|| Array1::zeros(layer.biases.len()));
        let v = self.v_b.get_or_insert_with(|| Array1::zeros(layer.biases.len()));
        *m = &*m * self.beta1 + &gradients.biases * (1.0 - self.beta1);
        *v = &*v * self.beta2 + &(&gradients.biases * &gradients.biases) * (1.0 - self.beta2);
        let m_hat = &*m / correction1;
        let v_hat = &*v / correction2;
        layer.biases -= &(m_hat * self.learning_rate / (v_hat.mapv(f64::sqrt) + self.epsilon));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activation::ActivationType;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_adam_moves_against_gradient() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut layer = DenseLayer::new(3, 2, ActivationType::ReLU, &mut rng);
        let before = layer.clone();
        let grads = LayerGradients {
            input: Array2::zeros((1, 3)),
            weights: Array2::ones((3, 2)),
            biases: Array1::from_vec(vec![-1.0, 1.0]),
        };

        let mut adam = Adam::new(0.001);
        adam.step(&mut layer, &grads);

        // First bias-corrected step has magnitude ~learning_rate
        for (w, w0) in layer.weights.iter().zip(before.weights.iter()) {
            assert!((w0 - w - 0.001).abs() < 1e-6);
        }
        assert!(layer.biases[0] > 0.0);
        assert!(layer.biases[1] < 0.0);
    }
}
