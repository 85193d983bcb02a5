//! Best-model checkpoint persisted as JSON

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::network::NeuralNetwork;
use crate::artifacts::write_json;
use crate::error::PipelineResult;

/// Saved network weights with the validation scores they achieved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub run_id: Uuid,
    /// 1-based epoch the weights come from
    pub epoch: usize,
    pub val_auc: f64,
    /// `None` when the validation loss was not finite
    pub val_loss: Option<f64>,
    pub saved_at: DateTime<Utc>,
    pub network: NeuralNetwork,
}

impl Checkpoint {
    pub fn new(run_id: Uuid, epoch: usize, val_auc: f64, val_loss: f64, network: NeuralNetwork) -> Self {
        Self {
            run_id,
            epoch,
            val_auc,
            val_loss: val_loss.is_finite().then_some(val_loss),
            saved_at: Utc::now(),
            network,
        }
    }

    /// Write the checkpoint, replacing any previous file at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> PipelineResult<()> {
        write_json(path.as_ref(), self)
    }

    /// Read a checkpoint and check the network shapes
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let checkpoint: Checkpoint = serde_json::from_str(&fs::read_to_string(path)?)?;
        checkpoint.network.validate()?;

        info!(
            path = %path.display(),
            run_id = %checkpoint.run_id,
            epoch = checkpoint.epoch,
            val_auc = checkpoint.val_auc,
            "Loaded model checkpoint"
        );
        Ok(checkpoint)
    }
}
