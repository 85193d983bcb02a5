//! Prediction result returned by the inference helper

use serde::{Deserialize, Serialize};

use super::transaction::Class;

/// Decision threshold used when none is configured
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Fraud probability for one transaction and the label derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Model output in [0, 1]
    pub probability: f64,
    /// "Fraud" or "Legitimate"
    pub label: String,
}

impl PredictionResult {
    /// Threshold a probability; a probability equal to the threshold is fraud.
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        let class = classify(probability, threshold);
        Self {
            probability,
            label: class.label().to_string(),
        }
    }

    pub fn class(&self) -> Class {
        if self.label == Class::Fraud.label() {
            Class::Fraud
        } else {
            Class::Legitimate
        }
    }

    pub fn is_fraud(&self) -> bool {
        self.class() == Class::Fraud
    }
}

/// Map a probability to a class with `>=` semantics
pub fn classify(probability: f64, threshold: f64) -> Class {
    if probability >= threshold {
        Class::Fraud
    } else {
        Class::Legitimate
    }
}
