//! Mini-batch training loop with early stopping and best-AUC checkpointing

use std::path::PathBuf;
use std::time::Instant;

use ndarray::{Array1, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::callbacks::{EarlyStopping, ModelCheckpoint};
use super::network::NeuralNetwork;
use crate::config::{TrainingSettings, WeightSelection};
use crate::data::Dataset;
use crate::error::{PipelineError, PipelineResult};
use crate::evaluation::{roc_auc, ConfusionMatrix};
use crate::sampling::ClassWeights;
use crate::types::prediction::DEFAULT_THRESHOLD;

/// Training hyperparameters
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub patience: usize,
    pub learning_rate: f64,
    /// Seed for per-epoch shuffling and dropout masks
    pub seed: u64,
    pub weight_selection: WeightSelection,
    /// Where the best-AUC checkpoint is written; `None` keeps it in memory
    pub checkpoint_path: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 2048,
            patience: 5,
            learning_rate: 0.001,
            seed: 42,
            weight_selection: WeightSelection::ValAuc,
            checkpoint_path: None,
        }
    }
}

impl TrainingConfig {
    pub fn from_settings(settings: &TrainingSettings, seed: u64, checkpoint_path: Option<PathBuf>) -> Self {
        Self {
            epochs: settings.epochs,
            batch_size: settings.batch_size,
            patience: settings.patience,
            learning_rate: settings.learning_rate,
            seed,
            weight_selection: settings.weight_selection,
            checkpoint_path,
        }
    }
}

/// Loss and thresholded metrics on one split for one epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplitMetrics {
    pub loss: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub auc: f64,
}

impl SplitMetrics {
    fn compute(loss: f64, labels: &Array1<f64>, scores: &Array1<f64>) -> Self {
        let cm = ConfusionMatrix::from_scores(labels, scores, DEFAULT_THRESHOLD);
        Self {
            loss,
            accuracy: cm.accuracy(),
            precision: cm.precision(),
            recall: cm.recall(),
            auc: roc_auc(labels, scores),
        }
    }
}

/// Metrics recorded at the end of an epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochMetrics {
    /// 1-based
    pub epoch: usize,
    pub train: SplitMetrics,
    pub validation: SplitMetrics,
}

/// Outcome of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingHistory {
    pub run_id: Uuid,
    pub epochs: Vec<EpochMetrics>,
    /// Epoch at which early stopping fired, if it did
    pub stopped_epoch: Option<usize>,
    pub best_loss_epoch: usize,
    pub best_auc_epoch: usize,
    pub weight_selection: WeightSelection,
    /// Epoch whose weights the network holds after `fit`
    pub restored_epoch: Option<usize>,
}

impl TrainingHistory {
    pub fn epochs_run(&self) -> usize {
        self.epochs.len()
    }
}

/// Fits a [`NeuralNetwork`] with Adam and weighted binary cross-entropy
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Train `network` in place.
    ///
    /// `class_weights` scales the training loss per sample; validation loss is
    /// always unweighted. After the last epoch the network holds the weights
    /// chosen by `weight_selection`.
    pub fn fit(
        &self,
        network: &mut NeuralNetwork,
        train: &Dataset,
        validation: &Dataset,
        class_weights: Option<&ClassWeights>,
    ) -> PipelineResult<TrainingHistory> {
        self.check_inputs(network, train, validation)?;

        let run_id = Uuid::new_v4();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut optimizers = network.optimizers(self.config.learning_rate);
        let mut stopper = EarlyStopping::new(self.config.patience);
        let mut checkpoint = ModelCheckpoint::new(self.config.checkpoint_path.clone(), run_id);

        let targets = train.targets();
        let sample_weights = match class_weights {
            Some(weights) => weights.sample_weights(&train.labels),
            None => Array1::ones(train.len()),
        };
        let val_targets = validation.targets();

        info!(
            %run_id,
            train_rows = train.len(),
            validation_rows = validation.len(),
            epochs = self.config.epochs,
            batch_size = self.config.batch_size,
            weighted = class_weights.is_some(),
            "Starting training"
        );

        let mut indices: Vec<usize> = (0..train.len()).collect();
        let mut history = Vec::with_capacity(self.config.epochs);
        let mut stopped_epoch = None;

        for epoch in 1..=self.config.epochs {
            let started = Instant::now();
            indices.shuffle(&mut rng);

            let mut train_scores = Array1::zeros(train.len());
            let mut loss_sum = 0.0;

            for (batch_no, batch) in indices.chunks(self.config.batch_size).enumerate() {
                let x = train.features.select(Axis(0), batch);
                let y = targets.select(Axis(0), batch);
                let w = sample_weights.select(Axis(0), batch);

                let predictions = network.train_step(&x, &y, &w, &mut optimizers, &mut rng);
                let batch_loss = NeuralNetwork::compute_loss(&predictions, &y, Some(&w));
                loss_sum += batch_loss * batch.len() as f64;

                for (&row, &p) in batch.iter().zip(predictions.column(0).iter()) {
                    train_scores[row] = p;
                }
                debug!(epoch, batch = batch_no, loss = batch_loss, "Batch done");
            }

            let train_metrics = SplitMetrics::compute(loss_sum / train.len() as f64, &train.labels, &train_scores);

            let val_pred = network.predict(&validation.features);
            let val_loss = NeuralNetwork::compute_loss(&val_pred, &val_targets, None);
            let val_scores = val_pred.index_axis_move(Axis(1), 0);
            let val_metrics = SplitMetrics::compute(val_loss, &validation.labels, &val_scores);

            if !val_loss.is_finite() {
                warn!(epoch, "Validation loss is not finite");
            }

            info!(
                epoch,
                loss = format!("{:.4}", train_metrics.loss),
                auc = format!("{:.4}", train_metrics.auc),
                val_loss = format!("{:.4}", val_metrics.loss),
                val_accuracy = format!("{:.4}", val_metrics.accuracy),
                val_precision = format!("{:.4}", val_metrics.precision),
                val_recall = format!("{:.4}", val_metrics.recall),
                val_auc = format!("{:.4}", val_metrics.auc),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Epoch complete"
            );

            history.push(EpochMetrics {
                epoch,
                train: train_metrics,
                validation: val_metrics,
            });

            checkpoint.on_epoch_end(epoch, val_metrics.auc, val_loss, network)?;
            if stopper.on_epoch_end(epoch, val_loss, network) {
                info!(
                    epoch,
                    best_epoch = stopper.best_epoch(),
                    patience = self.config.patience,
                    "Early stopping"
                );
                stopped_epoch = Some(epoch);
                break;
            }
        }

        let restored = match self.config.weight_selection {
            WeightSelection::ValAuc => checkpoint.restore_best(network).then(|| checkpoint.best_epoch()),
            WeightSelection::ValLoss => stopper.restore_best(network).then(|| stopper.best_epoch()),
        };
        match restored {
            Some(epoch) => info!(
                selection = ?self.config.weight_selection,
                epoch,
                "Restored best weights"
            ),
            None => warn!(
                selection = ?self.config.weight_selection,
                "No best epoch recorded; keeping final weights"
            ),
        }

        Ok(TrainingHistory {
            run_id,
            epochs: history,
            stopped_epoch,
            best_loss_epoch: stopper.best_epoch(),
            best_auc_epoch: checkpoint.best_epoch(),
            weight_selection: self.config.weight_selection,
            restored_epoch: restored,
        })
    }

    fn check_inputs(&self, network: &NeuralNetwork, train: &Dataset, validation: &Dataset) -> PipelineResult<()> {
        if self.config.epochs == 0 || self.config.batch_size == 0 {
            return Err(PipelineError::InvalidParameter(
                "epochs and batch_size must be positive".to_string(),
            ));
        }
        if train.is_empty() || validation.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }
        for dataset in [train, validation] {
            if dataset.n_features() != network.input_size() {
                return Err(PipelineError::InvalidInput {
                    expected: network.input_size(),
                    actual: dataset.n_features(),
                });
            }
        }
        Ok(())
    }
}
