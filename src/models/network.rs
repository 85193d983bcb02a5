//! Feedforward network for binary fraud classification

use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::activation::ActivationType;
use super::layer::{DenseLayer, ForwardCache, LayerGradients};
use super::optimizer::Adam;
use crate::error::{PipelineError, PipelineResult};

/// Probabilities are clipped to `[EPSILON, 1 - EPSILON]` inside the loss
const EPSILON: f64 = 1e-7;

/// Network topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub layer_sizes: Vec<usize>,
    pub activations: Vec<ActivationType>,
    pub dropout_rates: Vec<f64>,
}

impl NetworkConfig {
    pub fn new(input_size: usize) -> Self {
        Self {
            layer_sizes: vec![input_size],
            activations: vec![],
            dropout_rates: vec![],
        }
    }

    /// Add a hidden layer followed by dropout
    pub fn add_layer_with_dropout(
        mut self,
        size: usize,
        activation: ActivationType,
        dropout: f64,
    ) -> Self {
        self.layer_sizes.push(size);
        self.activations.push(activation);
        self.dropout_rates.push(dropout);
        self
    }

    /// Set output layer
    pub fn output_layer(mut self, size: usize, activation: ActivationType) -> Self {
        self.layer_sizes.push(size);
        self.activations.push(activation);
        self.dropout_rates.push(0.0);
        self
    }

    /// 32-16-8 ReLU stack with dropout 0.3/0.2/0.2 and a sigmoid output
    pub fn fraud_detector(input_size: usize) -> Self {
        Self::new(input_size)
            .add_layer_with_dropout(32, ActivationType::ReLU, 0.3)
            .add_layer_with_dropout(16, ActivationType::ReLU, 0.2)
            .add_layer_with_dropout(8, ActivationType::ReLU, 0.2)
            .output_layer(1, ActivationType::Sigmoid)
    }

    pub fn input_size(&self) -> usize {
        self.layer_sizes[0]
    }
}

/// Feedforward neural network with a single sigmoid output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralNetwork {
    pub config: NetworkConfig,
    pub layers: Vec<DenseLayer>,
}

impl NeuralNetwork {
    /// Create network from configuration with seeded initialization
    pub fn from_config(config: NetworkConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let layers = (0..config.activations.len())
            .map(|i| {
                DenseLayer::new(
                    config.layer_sizes[i],
                    config.layer_sizes[i + 1],
                    config.activations[i],
                    &mut rng,
                )
                .with_dropout(config.dropout_rates[i])
            })
            .collect();

        Self { config, layers }
    }

    /// The fixed fraud classification architecture
    pub fn fraud_detector(input_size: usize, seed: u64) -> Self {
        Self::from_config(NetworkConfig::fraud_detector(input_size), seed)
    }

    pub fn input_size(&self) -> usize {
        self.config.input_size()
    }

    /// Check that layer shapes chain together and end in one sigmoid unit.
    pub fn validate(&self) -> PipelineResult<()> {
        let mut expected = self.input_size();
        for layer in &self.layers {
            if layer.weights.dim() != (expected, layer.output_size)
                || layer.biases.len() != layer.output_size
            {
                return Err(PipelineError::InvalidInput {
                    expected,
                    actual: layer.weights.nrows(),
                });
            }
            expected = layer.output_size;
        }

        match self.layers.last() {
            Some(last) if last.output_size == 1 && last.activation_type == ActivationType::Sigmoid => {
                Ok(())
            }
            _ => Err(PipelineError::InvalidParameter(
                "network must end in a single sigmoid unit".to_string(),
            )),
        }
    }

    /// Inference forward pass (dropout disabled)
    pub fn predict(&self, input: &Array2<f64>) -> Array2<f64> {
        self.layers
            .iter()
            .fold(input.clone(), |output, layer| layer.forward(&output))
    }

    /// Fraud probability per row
    pub fn predict_proba(&self, input: &Array2<f64>) -> Array1<f64> {
        self.predict(input).index_axis_move(Axis(1), 0)
    }

    /// Training forward pass keeping per-layer caches
    pub fn forward_train<R: Rng + ?Sized>(
        &self,
        input: &Array2<f64>,
        rng: &mut R,
    ) -> (Array2<f64>, Vec<ForwardCache>) {
        let mut caches = Vec::with_capacity(self.layers.len());
        let mut output = input.clone();
        for layer in &self.layers {
            let (next, cache) = layer.forward_train(&output, rng);
            caches.push(cache);
            output = next;
        }
        (output, caches)
    }

    /// Mean (optionally sample-weighted) binary cross-entropy.
    pub fn compute_loss(
        predictions: &Array2<f64>,
        targets: &Array2<f64>,
        sample_weights: Option<&Array1<f64>>,
    ) -> f64 {
        let n = predictions.nrows() as f64;
        if n == 0.0 {
            return 0.0;
        }

        let p = predictions.mapv(|v| v.clamp(EPSILON, 1.0 - EPSILON));
        let per_sample = -(targets * &p.mapv(f64::ln) + &(1.0 - targets) * &(1.0 - &p).mapv(f64::ln));
        let per_sample = per_sample.index_axis_move(Axis(1), 0);

        match sample_weights {
            Some(w) => (&per_sample * w).sum() / n,
            None => per_sample.sum() / n,
        }
    }

    /// Backpropagate weighted cross-entropy through all layers.
    ///
    /// For a sigmoid output the loss gradient with respect to the logit is
    /// `w * (p - y) / n`, which is passed straight to the output layer.
    pub fn gradients(
        &self,
        caches: &[ForwardCache],
        predictions: &Array2<f64>,
        targets: &Array2<f64>,
        sample_weights: &Array1<f64>,
    ) -> Vec<LayerGradients> {
        let n = predictions.nrows() as f64;
        let weights = sample_weights.view().insert_axis(Axis(1));
        let delta = (predictions - targets) * &weights / n;

        let mut grads = Vec::with_capacity(self.layers.len());
        let last = self.layers.len() - 1;
        let mut layer_grads = self.layers[last].backward_delta(&caches[last], &delta);

        for i in (0..last).rev() {
            let upstream = self.layers[i].backward(&caches[i], &layer_grads.input);
            grads.push(layer_grads);
            layer_grads = upstream;
        }
        grads.push(layer_grads);
        grads.reverse();
        grads
    }

    /// Update every layer with its gradients
    pub fn apply_gradients(&mut self, gradients: &[LayerGradients], optimizers: &mut [Adam]) {
        for ((layer, grads), optimizer) in self
            .layers
            .iter_mut()
            .zip(gradients.iter())
            .zip(optimizers.iter_mut())
        {
            optimizer.step(layer, grads);
        }
    }

    /// One optimization step on a mini-batch; returns the batch predictions.
    pub fn train_step<R: Rng + ?Sized>(
        &mut self,
        x_batch: &Array2<f64>,
        y_batch: &Array2<f64>,
        sample_weights: &Array1<f64>,
        optimizers: &mut [Adam],
        rng: &mut R,
    ) -> Array2<f64> {
        let (predictions, caches) = self.forward_train(x_batch, rng);
        let grads = self.gradients(&caches, &predictions, y_batch, sample_weights);
        self.apply_gradients(&grads, optimizers);
        predictions
    }

    /// One Adam instance per layer
    pub fn optimizers(&self, learning_rate: f64) -> Vec<Adam> {
        self.layers.iter().map(|_| Adam::new(learning_rate)).collect()
    }

    /// Get total number of parameters
    pub fn num_parameters(&self) -> usize {
        self.layers.iter().map(|l| l.num_parameters()).sum()
    }

    /// Log network summary
    pub fn summary(&self) {
        info!(input_size = self.input_size(), "Network summary");
        for (i, layer) in self.layers.iter().enumerate() {
            info!(
                layer = i + 1,
                shape = format!("{} -> {}", layer.input_size, layer.output_size),
                activation = ?layer.activation_type,
                dropout = layer.dropout_rate,
                params = layer.num_parameters(),
                "Dense layer"
            );
        }
        info!(total_params = self.num_parameters(), "Network parameters");
    }
}
