//! Exploratory statistics over a loaded dataset

use serde::{Deserialize, Serialize};
use tracing::info;

use super::dataset::{ClassCounts, Dataset};
use crate::feature_extractor::FEATURE_COUNT;

const TIME_COLUMN: usize = 0;
const AMOUNT_COLUMN: usize = FEATURE_COUNT - 1;

/// Amount and time statistics for one class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassStats {
    pub count: usize,
    pub amount_mean: f64,
    pub amount_min: f64,
    pub amount_max: f64,
    pub time_mean: f64,
}

/// Class distribution and per-class statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub counts: ClassCounts,
    pub fraud_ratio: f64,
    pub legitimate: Option<ClassStats>,
    pub fraud: Option<ClassStats>,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let counts = dataset.class_counts();
        Self {
            counts,
            fraud_ratio: counts.fraud_ratio(),
            legitimate: class_stats(dataset, false),
            fraud: class_stats(dataset, true),
        }
    }

    /// Log the summary at info level
    pub fn log(&self) {
        info!(
            rows = self.counts.total(),
            legitimate = self.counts.legitimate,
            fraud = self.counts.fraud,
            fraud_pct = format!("{:.4}%", self.fraud_ratio * 100.0),
            "Class distribution"
        );
        for (name, stats) in [("legitimate", &self.legitimate), ("fraud", &self.fraud)] {
            if let Some(s) = stats {
                info!(
                    class = name,
                    count = s.count,
                    amount_mean = format!("{:.2}", s.amount_mean),
                    amount_min = format!("{:.2}", s.amount_min),
                    amount_max = format!("{:.2}", s.amount_max),
                    time_mean = format!("{:.1}", s.time_mean),
                    "Class statistics"
                );
            }
        }
    }
}

fn class_stats(dataset: &Dataset, fraud: bool) -> Option<ClassStats> {
    let rows: Vec<usize> = (0..dataset.len())
        .filter(|&i| (dataset.labels[i] >= 0.5) == fraud)
        .collect();
    if rows.is_empty() {
        return None;
    }

    let n = rows.len() as f64;
    let amounts: Vec<f64> = rows
        .iter()
        .map(|&i| dataset.features[[i, AMOUNT_COLUMN]])
        .collect();
    let time_sum: f64 = rows
        .iter()
        .map(|&i| dataset.features[[i, TIME_COLUMN]])
        .sum();

    Some(ClassStats {
        count: rows.len(),
        amount_mean: amounts.iter().sum::<f64>() / n,
        amount_min: amounts.iter().copied().fold(f64::INFINITY, f64::min),
        amount_max: amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        time_mean: time_sum / n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::{Class, Transaction};

    fn tx(time: f64, amount: f64, class: Class) -> Transaction {
        let mut features = [0.0; FEATURE_COUNT];
        features[TIME_COLUMN] = time;
        features[AMOUNT_COLUMN] = amount;
        Transaction::new(features, class)
    }

    #[test]
    fn test_summary_per_class() {
        let dataset = Dataset::from_transactions(&[
            tx(0.0, 10.0, Class::Legitimate),
            tx(10.0, 30.0, Class::Legitimate),
            tx(5.0, 500.0, Class::Fraud),
        ])
        .unwrap();

        let summary = DatasetSummary::from_dataset(&dataset);
        let legit = summary.legitimate.unwrap();
        let fraud = summary.fraud.unwrap();

        assert_eq!(legit.count, 2);
        assert_eq!(legit.amount_mean, 20.0);
        assert_eq!(legit.amount_min, 10.0);
        assert_eq!(legit.amount_max, 30.0);
        assert_eq!(legit.time_mean, 5.0);
        assert_eq!(fraud.count, 1);
        assert_eq!(fraud.amount_mean, 500.0);
        assert!((summary.fraud_ratio - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_without_fraud() {
        let dataset = Dataset::from_transactions(&[tx(0.0, 1.0, Class::Legitimate)]).unwrap();
        let summary = DatasetSummary::from_dataset(&dataset);
        assert!(summary.fraud.is_none());
        assert_eq!(summary.fraud_ratio, 0.0);
    }
}
