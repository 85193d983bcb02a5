//! Type definitions for the fraud detection trainer

pub mod prediction;
pub mod transaction;

pub use prediction::{PredictionResult, DEFAULT_THRESHOLD};
pub use transaction::{Class, Transaction};
