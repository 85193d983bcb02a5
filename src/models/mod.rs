//! Neural network model: layers, training loop, checkpoints and inference

pub mod activation;
pub mod callbacks;
pub mod checkpoint;
pub mod inference;
pub mod layer;
pub mod network;
pub mod optimizer;
pub mod trainer;

pub use checkpoint::Checkpoint;
pub use inference::{predict_transaction, FraudPredictor};
pub use network::{NetworkConfig, NeuralNetwork};
pub use trainer::{Trainer, TrainingConfig, TrainingHistory};
