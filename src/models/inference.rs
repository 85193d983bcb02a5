//! Single-transaction inference with a fitted scaler and trained network

use std::path::Path;

use ndarray::{Array2, ArrayView1, Axis};
use tracing::{debug, info};

use super::checkpoint::Checkpoint;
use super::network::NeuralNetwork;
use crate::error::{PipelineError, PipelineResult};
use crate::feature_extractor::FeatureExtractor;
use crate::preprocessing::StandardScaler;
use crate::types::prediction::PredictionResult;

/// Score one raw feature vector.
///
/// `raw` holds the 30 features in canonical order (`Time`, `V1`..`V28`,
/// `Amount`). The vector is standardized with `scaler`, passed through the
/// network once, and thresholded with `>=`.
pub fn predict_transaction(
    raw: &[f64],
    scaler: &StandardScaler,
    model: &NeuralNetwork,
    threshold: f64,
) -> PipelineResult<PredictionResult> {
    let features = FeatureExtractor::vector_from_slice(raw)?;
    let scaled = scaler.transform_row(ArrayView1::from(&features[..]))?;
    if scaled.len() != model.input_size() {
        return Err(PipelineError::InvalidInput {
            expected: model.input_size(),
            actual: scaled.len(),
        });
    }

    let probability = model.predict_proba(&scaled.insert_axis(Axis(0)))[0];
    Ok(PredictionResult::from_probability(probability, threshold))
}

/// Scaler, network and decision threshold bundled for serving predictions
#[derive(Debug, Clone)]
pub struct FraudPredictor {
    scaler: StandardScaler,
    network: NeuralNetwork,
    threshold: f64,
}

impl FraudPredictor {
    pub fn new(scaler: StandardScaler, network: NeuralNetwork, threshold: f64) -> PipelineResult<Self> {
        if scaler.n_features() != network.input_size() {
            return Err(PipelineError::InvalidInput {
                expected: network.input_size(),
                actual: scaler.n_features(),
            });
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PipelineError::InvalidParameter(format!(
                "threshold must be in [0, 1], got {}",
                threshold
            )));
        }
        Ok(Self {
            scaler,
            network,
            threshold,
        })
    }

    /// Load the persisted scaler state and best-model checkpoint
    pub fn from_artifacts(
        scaler_path: impl AsRef<Path>,
        checkpoint_path: impl AsRef<Path>,
        threshold: f64,
    ) -> PipelineResult<Self> {
        let scaler = StandardScaler::load(scaler_path.as_ref())?;
        let checkpoint = Checkpoint::load(checkpoint_path.as_ref())?;

        info!(
            scaler = %scaler_path.as_ref().display(),
            checkpoint_epoch = checkpoint.epoch,
            threshold,
            "Fraud predictor ready"
        );
        Self::new(scaler, checkpoint.network, threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Score one raw feature vector
    pub fn predict(&self, raw: &[f64]) -> PipelineResult<PredictionResult> {
        let result = predict_transaction(raw, &self.scaler, &self.network, self.threshold)?;
        debug!(probability = result.probability, label = %result.label, "Prediction");
        Ok(result)
    }

    /// Score many raw vectors in one forward pass.
    ///
    /// Fails on the first invalid vector.
    pub fn predict_batch(&self, raws: &[Vec<f64>]) -> PipelineResult<Vec<PredictionResult>> {
        let mut batch = Array2::zeros((raws.len(), self.scaler.n_features()));
        for (i, raw) in raws.iter().enumerate() {
            let features = FeatureExtractor::vector_from_slice(raw)?;
            batch.row_mut(i).assign(&ArrayView1::from(&features[..]));
        }

        let scaled = self.scaler.transform(&batch)?;
        Ok(self
            .network
            .predict_proba(&scaled)
            .iter()
            .map(|&p| PredictionResult::from_probability(p, self.threshold))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::{FEATURE_COUNT, FEATURE_NAMES};

    fn fitted_scaler() -> StandardScaler {
        let data = Array2::from_shape_fn((8, FEATURE_COUNT), |(i, j)| (i * (j + 1)) as f64 + 0.5 * j as f64);
        StandardScaler::fit(&data, &FEATURE_NAMES).unwrap()
    }

    fn sample_vector() -> Vec<f64> {
        (0..FEATURE_COUNT).map(|j| j as f64 * 0.7 - 3.0).collect()
    }

    #[test]
    fn test_predict_is_deterministic() {
        let scaler = fitted_scaler();
        let model = NeuralNetwork::fraud_detector(FEATURE_COUNT, 42);
        let raw = sample_vector();

        let first = predict_transaction(&raw, &scaler, &model, 0.5).unwrap();
        let second = predict_transaction(&raw, &scaler, &model, 0.5).unwrap();
        assert_eq!(first, second);
        assert!((0.0..=1.0).contains(&first.probability));
    }

    #[test]
    fn test_wrong_length_rejected() {
        let scaler = fitted_scaler();
        let model = NeuralNetwork::fraud_detector(FEATURE_COUNT, 42);
        let result = predict_transaction(&[1.0; 29], &scaler, &model, 0.5);
        assert!(matches!(
            result,
            Err(PipelineError::InvalidInput { expected: 30, actual: 29 })
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let scaler = fitted_scaler();
        let model = NeuralNetwork::fraud_detector(FEATURE_COUNT, 42);
        let mut raw = sample_vector();
        raw[3] = f64::NAN;
        assert!(matches!(
            predict_transaction(&raw, &scaler, &model, 0.5),
            Err(PipelineError::NonFiniteInput { .. })
        ));
    }

    #[test]
    fn test_threshold_at_probability_is_fraud() {
        let scaler = fitted_scaler();
        let model = NeuralNetwork::fraud_detector(FEATURE_COUNT, 1);
        let raw = sample_vector();
        let p = predict_transaction(&raw, &scaler, &model, 0.5).unwrap().probability;

        assert_eq!(predict_transaction(&raw, &scaler, &model, p).unwrap().label, "Fraud");
    }

    #[test]
    fn test_batch_matches_single() {
        let predictor =
            FraudPredictor::new(fitted_scaler(), NeuralNetwork::fraud_detector(FEATURE_COUNT, 9), 0.5)
                .unwrap();
        let a = sample_vector();
        let b: Vec<f64> = a.iter().map(|v| -v).collect();

        let batch = predictor.predict_batch(&[a.clone(), b.clone()]).unwrap();
        let single_a = predictor.predict(&a).unwrap();
        let single_b = predictor.predict(&b).unwrap();
        assert!((batch[0].probability - single_a.probability).abs() < 1e-12);
        assert!((batch[1].probability - single_b.probability).abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_scaler_rejected() {
        let result = FraudPredictor::new(fitted_scaler(), NeuralNetwork::fraud_detector(10, 0), 0.5);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_artifacts_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let scaler_path = dir.path().join("scaler.json");
        let model_path = dir.path().join("model.json");
        let scaler = fitted_scaler();
        let network = NeuralNetwork::fraud_detector(FEATURE_COUNT, 5);

        scaler.save(&scaler_path).unwrap();
        Checkpoint::new(uuid::Uuid::new_v4(), 1, 0.9, 0.1, network.clone())
            .save(&model_path)
            .unwrap();

        let predictor = FraudPredictor::from_artifacts(&scaler_path, &model_path, 0.5).unwrap();
        let raw = sample_vector();
        let expected = predict_transaction(&raw, &scaler, &network, 0.5).unwrap();
        assert_eq!(predictor.predict(&raw).unwrap(), expected);
    }
}
