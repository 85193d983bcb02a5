//! Transaction record and class label definitions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::feature_extractor::FEATURE_COUNT;

/// Binary transaction label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Class {
    /// Class 0
    Legitimate,
    /// Class 1
    Fraud,
}

impl Class {
    /// Parse the numeric `Class` column value (0 or 1)
    pub fn from_value(value: f64) -> Option<Self> {
        if value == 0.0 {
            Some(Class::Legitimate)
        } else if value == 1.0 {
            Some(Class::Fraud)
        } else {
            None
        }
    }

    /// Numeric target used for training (0.0 / 1.0)
    pub fn as_target(self) -> f64 {
        match self {
            Class::Legitimate => 0.0,
            Class::Fraud => 1.0,
        }
    }

    /// Human readable label returned by the predictor
    pub fn label(self) -> &'static str {
        match self {
            Class::Legitimate => "Legitimate",
            Class::Fraud => "Fraud",
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single labelled card transaction as read from the dataset.
///
/// Features are stored in canonical order (`Time`, `V1`..`V28`, `Amount`),
/// regardless of the column order in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub features: [f64; FEATURE_COUNT],
    pub class: Class,
}

impl Transaction {
    pub fn new(features: [f64; FEATURE_COUNT], class: Class) -> Self {
        Self { features, class }
    }

    /// Transaction time offset in seconds
    pub fn time(&self) -> f64 {
        self.features[0]
    }

    /// Transaction amount
    pub fn amount(&self) -> f64 {
        self.features[FEATURE_COUNT - 1]
    }

    pub fn is_fraud(&self) -> bool {
        self.class == Class::Fraud
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_from_value() {
        assert_eq!(Class::from_value(0.0), Some(Class::Legitimate));
        assert_eq!(Class::from_value(1.0), Some(Class::Fraud));
        assert_eq!(Class::from_value(2.0), None);
        assert_eq!(Class::from_value(f64::NAN), None);
    }

    #[test]
    fn test_transaction_accessors() {
        let mut features = [0.0; FEATURE_COUNT];
        features[0] = 406.0;
        features[FEATURE_COUNT - 1] = 149.62;
        let tx = Transaction::new(features, Class::Fraud);

        assert_eq!(tx.time(), 406.0);
        assert_eq!(tx.amount(), 149.62);
        assert!(tx.is_fraud());
        assert_eq!(tx.class.to_string(), "Fraud");
    }
}
