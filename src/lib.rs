//! Fraud Detection Trainer Library
//!
//! Trains a small feed-forward network to flag fraudulent card transactions:
//! CSV loading, stratified splitting, standardization, class-imbalance
//! handling, training with early stopping and checkpointing, evaluation, and
//! single-transaction inference from the persisted artifacts.

pub mod artifacts;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod sampling;
pub mod types;

pub use config::AppConfig;
pub use data::Dataset;
pub use error::{PipelineError, PipelineResult};
pub use evaluation::{evaluate, EvaluationReport};
pub use feature_extractor::FeatureExtractor;
pub use models::inference::{predict_transaction, FraudPredictor};
pub use models::network::NeuralNetwork;
pub use preprocessing::StandardScaler;
pub use types::{prediction::PredictionResult, transaction::Transaction};
