//! Epoch-end callbacks: early stopping on validation loss and best-AUC
//! checkpointing

use std::path::PathBuf;

use tracing::{debug, info};
use uuid::Uuid;

use super::checkpoint::Checkpoint;
use super::layer::DenseLayer;
use super::network::NeuralNetwork;
use crate::error::PipelineResult;

/// Stops training after `patience` epochs without a lower validation loss
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    pub patience: usize,
    best_loss: f64,
    best_epoch: usize,
    wait: usize,
    best_layers: Option<Vec<DenseLayer>>,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_loss: f64::INFINITY,
            best_epoch: 0,
            wait: 0,
            best_layers: None,
        }
    }

    /// Record an epoch; returns `true` when training should stop.
    ///
    /// Only a strictly lower loss counts as an improvement. NaN never does.
    pub fn on_epoch_end(&mut self, epoch: usize, val_loss: f64, network: &NeuralNetwork) -> bool {
        if val_loss < self.best_loss {
            self.best_loss = val_loss;
            self.best_epoch = epoch;
            self.wait = 0;
            self.best_layers = Some(network.layers.clone());
            return false;
        }

        self.wait += 1;
        debug!(epoch, wait = self.wait, patience = self.patience, "No validation loss improvement");
        self.wait >= self.patience
    }

    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    /// Epoch with the lowest validation loss, 0 if none was finite
    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }

    /// Copy the lowest-loss weights into `network`; false if none were kept.
    pub fn restore_best(&self, network: &mut NeuralNetwork) -> bool {
        match &self.best_layers {
            Some(layers) => {
                network.layers = layers.clone();
                true
            }
            None => false,
        }
    }
}

/// Keeps the weights with the highest validation AUC, optionally on disk
#[derive(Debug, Clone)]
pub struct ModelCheckpoint {
    path: Option<PathBuf>,
    run_id: Uuid,
    best_auc: f64,
    best_epoch: usize,
    best_layers: Option<Vec<DenseLayer>>,
}

impl ModelCheckpoint {
    pub fn new(path: Option<PathBuf>, run_id: Uuid) -> Self {
        Self {
            path,
            run_id,
            best_auc: f64::NEG_INFINITY,
            best_epoch: 0,
            best_layers: None,
        }
    }

    /// Record an epoch; returns `true` when the weights were kept as the new best.
    ///
    /// The file is only rewritten on a strict AUC improvement.
    pub fn on_epoch_end(
        &mut self,
        epoch: usize,
        val_auc: f64,
        val_loss: f64,
        network: &NeuralNetwork,
    ) -> PipelineResult<bool> {
        if !(val_auc > self.best_auc) {
            return Ok(false);
        }

        self.best_auc = val_auc;
        self.best_epoch = epoch;
        self.best_layers = Some(network.layers.clone());

        if let Some(path) = &self.path {
            Checkpoint::new(self.run_id, epoch, val_auc, val_loss, network.clone()).save(path)?;
            info!(epoch, val_auc = format!("{:.4}", val_auc), path = %path.display(), "Saved checkpoint");
        }
        Ok(true)
    }

    pub fn best_auc(&self) -> f64 {
        self.best_auc
    }

    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }

    /// Copy the best-AUC weights into `network`; false if none were kept.
    pub fn restore_best(&self, network: &mut NeuralNetwork) -> bool {
        match &self.best_layers {
            Some(layers) => {
                network.layers = layers.clone();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_stopping_patience() {
        let network = NeuralNetwork::fraud_detector(3, 0);
        let mut stopper = EarlyStopping::new(2);

        assert!(!stopper.on_epoch_end(1, 0.5, &network));
        assert!(!stopper.on_epoch_end(2, 0.4, &network));
        assert!(!stopper.on_epoch_end(3, 0.4, &network));
        assert!(stopper.on_epoch_end(4, 0.45, &network));
        assert_eq!(stopper.best_epoch(), 2);
        assert_eq!(stopper.best_loss(), 0.4);
    }

    #[test]
    fn test_nan_is_never_an_improvement() {
        let network = NeuralNetwork::fraud_detector(3, 0);
        let mut stopper = EarlyStopping::new(1);
        assert!(stopper.on_epoch_end(1, f64::NAN, &network));
        assert_eq!(stopper.best_epoch(), 0);

        let mut target = NeuralNetwork::fraud_detector(3, 1);
        assert!(!stopper.restore_best(&mut target));
    }

    #[test]
    fn test_early_stopping_restores_best_weights() {
        let best = NeuralNetwork::fraud_detector(3, 0);
        let later = NeuralNetwork::fraud_detector(3, 1);
        let mut stopper = EarlyStopping::new(5);
        stopper.on_epoch_end(1, 0.2, &best);
        stopper.on_epoch_end(2, 0.3, &later);

        let mut network = later.clone();
        assert!(stopper.restore_best(&mut network));
        assert_eq!(network.layers, best.layers);
    }

    #[test]
    fn test_checkpoint_writes_only_on_improvement() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.json");
        let first = NeuralNetwork::fraud_detector(3, 0);
        let second = NeuralNetwork::fraud_detector(3, 1);
        let mut checkpoint = ModelCheckpoint::new(Some(path.clone()), Uuid::new_v4());

        assert!(checkpoint.on_epoch_end(1, 0.80, 0.3, &first).unwrap());
        assert!(!checkpoint.on_epoch_end(2, 0.80, 0.2, &second).unwrap());
        assert!(!checkpoint.on_epoch_end(3, 0.75, 0.1, &second).unwrap());

        let saved = Checkpoint::load(&path).unwrap();
        assert_eq!(saved.epoch, 1);
        assert_eq!(saved.network, first);
        assert_eq!(checkpoint.best_epoch(), 1);
    }

    #[test]
    fn test_checkpoint_in_memory() {
        let network = NeuralNetwork::fraud_detector(3, 0);
        let mut checkpoint = ModelCheckpoint::new(None, Uuid::nil());
        assert!(checkpoint.on_epoch_end(1, 0.6, 0.5, &network).unwrap());
        assert_eq!(checkpoint.best_auc(), 0.6);
    }
}
