//! Standard (z-score) scaling fit once on training data
//!
//! `fit` consumes training features and returns the scaler state; `transform`
//! borrows the state immutably, so test and inference data can never refit it.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::artifacts::write_json;
use crate::error::{PipelineError, PipelineResult};

/// Variance below this is treated as zero
const MIN_STD: f64 = 1e-12;

/// Per-feature mean and population standard deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl StandardScaler {
    /// Fit mean and standard deviation (ddof = 0) per column.
    ///
    /// Fails on a column with zero variance rather than dividing by zero.
    pub fn fit(data: &Array2<f64>, feature_names: &[&str]) -> PipelineResult<Self> {
        if data.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        if feature_names.len() != data.ncols() {
            return Err(PipelineError::InvalidInput {
                expected: feature_names.len(),
                actual: data.ncols(),
            });
        }

        let mean = data
            .mean_axis(Axis(0))
            .ok_or(PipelineError::EmptyDataset)?;
        let std = data.std_axis(Axis(0), 0.0);

        if let Some(col) = std.iter().position(|&s| !(s > MIN_STD)) {
            return Err(PipelineError::ZeroVariance {
                feature: feature_names[col].to_string(),
            });
        }

        Ok(Self {
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            mean,
            std,
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardize a batch of rows with the stored state.
    pub fn transform(&self, data: &Array2<f64>) -> PipelineResult<Array2<f64>> {
        if data.ncols() != self.n_features() {
            return Err(PipelineError::InvalidInput {
                expected: self.n_features(),
                actual: data.ncols(),
            });
        }
        Ok((data - &self.mean) / &self.std)
    }

    /// Standardize a single feature vector.
    pub fn transform_row(&self, row: ArrayView1<f64>) -> PipelineResult<Array1<f64>> {
        if row.len() != self.n_features() {
            return Err(PipelineError::InvalidInput {
                expected: self.n_features(),
                actual: row.len(),
            });
        }
        Ok((&row - &self.mean) / &self.std)
    }

    /// Save scaler state as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PipelineResult<()> {
        write_json(path.as_ref(), self)
    }

    /// Load scaler state from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let scaler: Self = serde_json::from_reader(reader)?;
        if scaler.mean.len() != scaler.std.len() {
            return Err(PipelineError::InvalidInput {
                expected: scaler.mean.len(),
                actual: scaler.std.len(),
            });
        }
        Ok(scaler)
    }
}
