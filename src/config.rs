//! Configuration management for the fraud detection trainer

use anyhow::{Context, Result};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How class imbalance is handled on the training split
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImbalanceStrategy {
    /// Per-sample loss weights `N / (2 * count_c)`
    #[default]
    ClassWeight,
    /// SMOTE synthetic minority samples until the classes balance
    Oversample,
    /// Train on the raw distribution
    None,
}

/// Which weight set the trainer leaves in the model after fitting
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSelection {
    /// Weights from the epoch with the highest validation ROC-AUC (the checkpoint)
    #[default]
    ValAuc,
    /// Weights from the epoch with the lowest validation loss
    ValLoss,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub imbalance: ImbalanceConfig,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input dataset location
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// CSV file with `Time`, `V1`..`V28`, `Amount` and `Class` columns
    pub path: PathBuf,
}

/// Train/test split configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed for splitting, shuffling, oversampling and weight init
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_seed(),
        }
    }
}

/// Imbalance handling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ImbalanceConfig {
    #[serde(default)]
    pub strategy: ImbalanceStrategy,
    /// Neighbours considered by SMOTE
    #[serde(default = "default_k_neighbors")]
    pub k_neighbors: usize,
}

fn default_k_neighbors() -> usize {
    5
}

impl Default for ImbalanceConfig {
    fn default() -> Self {
        Self {
            strategy: ImbalanceStrategy::default(),
            k_neighbors: default_k_neighbors(),
        }
    }
}

/// Training loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingSettings {
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Share of the training split held out for validation
    #[serde(default = "default_validation_fraction")]
    pub validation_fraction: f64,
    /// Epochs without validation loss improvement before stopping
    #[serde(default = "default_patience")]
    pub patience: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub weight_selection: WeightSelection,
}

fn default_epochs() -> usize {
    50
}

fn default_batch_size() -> usize {
    2048
}

fn default_validation_fraction() -> f64 {
    0.2
}

fn default_patience() -> usize {
    5
}

fn default_learning_rate() -> f64 {
    0.001
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            validation_fraction: default_validation_fraction(),
            patience: default_patience(),
            learning_rate: default_learning_rate(),
            weight_selection: WeightSelection::default(),
        }
    }
}

/// Output artifact paths
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_scaler_path")]
    pub scaler_path: PathBuf,
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: PathBuf,
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

fn default_scaler_path() -> PathBuf {
    PathBuf::from("artifacts/scaler.json")
}

fn default_checkpoint_path() -> PathBuf {
    PathBuf::from("artifacts/best_model.json")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("artifacts/report.json")
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            scaler_path: default_scaler_path(),
            checkpoint_path: default_checkpoint_path(),
            report_path: default_report_path(),
        }
    }
}

/// Detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Probability at or above which a transaction is labelled fraud
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        let app: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app.validate()?;
        Ok(app)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let fraction_ok = |f: f64| f > 0.0 && f < 1.0;
        if !fraction_ok(self.split.test_fraction) {
            anyhow::bail!("split.test_fraction must be in (0, 1), got {}", self.split.test_fraction);
        }
        if !fraction_ok(self.training.validation_fraction) {
            anyhow::bail!(
                "training.validation_fraction must be in (0, 1), got {}",
                self.training.validation_fraction
            );
        }
        if self.training.epochs == 0 || self.training.batch_size == 0 {
            anyhow::bail!("training.epochs and training.batch_size must be positive");
        }
        if !(0.0..=1.0).contains(&self.detection.threshold) {
            anyhow::bail!("detection.threshold must be in [0, 1], got {}", self.detection.threshold);
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                path: PathBuf::from("data/creditcard.csv"),
            },
            split: SplitConfig::default(),
            imbalance: ImbalanceConfig::default(),
            training: TrainingSettings::default(),
            artifacts: ArtifactsConfig::default(),
            detection: DetectionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
