//! Inverse-frequency class weights

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::data::ClassCounts;
use crate::error::{PipelineError, PipelineResult};

/// Per-class loss multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassWeights {
    pub legitimate: f64,
    pub fraud: f64,
}

impl ClassWeights {
    /// `weight_c = N / (2 * count_c)`, so each class contributes `N / 2` in total.
    pub fn balanced(counts: ClassCounts) -> PipelineResult<Self> {
        if counts.legitimate == 0 {
            return Err(PipelineError::EmptyClass("legitimate".to_string()));
        }
        if counts.fraud == 0 {
            return Err(PipelineError::EmptyClass("fraud".to_string()));
        }

        let n = counts.total() as f64;
        Ok(Self {
            legitimate: n / (2.0 * counts.legitimate as f64),
            fraud: n / (2.0 * counts.fraud as f64),
        })
    }

    pub fn weight_for(&self, target: f64) -> f64 {
        if target >= 0.5 {
            self.fraud
        } else {
            self.legitimate
        }
    }

    /// Expand to one weight per sample
    pub fn sample_weights(&self, labels: &Array1<f64>) -> Array1<f64> {
        labels.mapv(|y| self.weight_for(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_balanced_weights_equalize_classes() {
        let counts = ClassCounts {
            legitimate: 8000,
            fraud: 16,
        };
        let weights = ClassWeights::balanced(counts).unwrap();
        let half = counts.total() as f64 / 2.0;

        assert_relative_eq!(weights.legitimate * 8000.0, half, epsilon = 1e-9);
        assert_relative_eq!(weights.fraud * 16.0, half, epsilon = 1e-9);
        assert_relative_eq!(weights.fraud, 250.5, epsilon = 1e-9);
        assert_relative_eq!(weights.fraud / weights.legitimate, 500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_class_fails() {
        let counts = ClassCounts {
            legitimate: 10,
            fraud: 0,
        };
        assert!(matches!(
            ClassWeights::balanced(counts),
            Err(PipelineError::EmptyClass(_))
        ));
    }

    #[test]
    fn test_sample_weights() {
        let weights = ClassWeights {
            legitimate: 0.5,
            fraud: 5.0,
        };
        let labels = Array1::from_vec(vec![0.0, 1.0, 0.0]);
        assert_eq!(
            weights.sample_weights(&labels),
            Array1::from_vec(vec![0.5, 5.0, 0.5])
        );
    }
}
