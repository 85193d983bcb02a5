//! Error types for the training and inference pipeline

use thiserror::Error;

/// Errors raised by the pipeline stages
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column '{0}' in dataset header")]
    MissingColumn(String),

    #[error("Malformed value '{value}' in column '{column}' at row {row}")]
    MalformedRow {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Invalid class label '{value}' at row {row} (expected 0 or 1)")]
    InvalidLabel { row: usize, value: String },

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Invalid input: expected {expected} features, got {actual}")]
    InvalidInput { expected: usize, actual: usize },

    #[error("Invalid input: feature '{feature}' is not finite ({value})")]
    NonFiniteInput { feature: String, value: f64 },

    #[error("Feature '{feature}' has zero variance in the training data")]
    ZeroVariance { feature: String },

    #[error("Class '{0}' has no samples")]
    EmptyClass(String),

    #[error("Oversampling needs at least 2 minority samples, found {0}")]
    InsufficientMinority(usize),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
