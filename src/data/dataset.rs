//! In-memory dataset and stratified splitting

use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::feature_extractor::FEATURE_COUNT;
use crate::types::transaction::Transaction;

/// Number of samples per class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub legitimate: usize,
    pub fraud: usize,
}

impl ClassCounts {
    pub fn total(&self) -> usize {
        self.legitimate + self.fraud
    }

    /// Share of fraud samples, 0.0 for an empty set
    pub fn fraud_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.fraud as f64 / total as f64
    }
}

/// Feature matrix (`rows x features`) with a 0/1 label per row
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
}

impl Dataset {
    pub fn new(features: Array2<f64>, labels: Array1<f64>) -> PipelineResult<Self> {
        if features.nrows() != labels.len() {
            return Err(PipelineError::InvalidParameter(format!(
                "feature rows ({}) and labels ({}) differ",
                features.nrows(),
                labels.len()
            )));
        }
        Ok(Self { features, labels })
    }

    /// Stack transaction records into a dataset, preserving order.
    pub fn from_transactions(transactions: &[Transaction]) -> PipelineResult<Self> {
        if transactions.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }

        let mut features = Array2::zeros((transactions.len(), FEATURE_COUNT));
        let mut labels = Array1::zeros(transactions.len());

        for (i, tx) in transactions.iter().enumerate() {
            features
                .row_mut(i)
                .assign(&ndarray::ArrayView1::from(&tx.features[..]));
            labels[i] = tx.class.as_target();
        }

        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn class_counts(&self) -> ClassCounts {
        let fraud = self.labels.iter().filter(|&&y| y >= 0.5).count();
        ClassCounts {
            legitimate: self.len() - fraud,
            fraud,
        }
    }

    /// Labels as a column vector, the shape the network trains on
    pub fn targets(&self) -> Array2<f64> {
        self.labels.clone().insert_axis(Axis(1))
    }

    /// Rows at the given indices, in that order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }

    /// Append rows from another dataset with the same feature width.
    pub fn concat(&self, other: &Dataset) -> PipelineResult<Self> {
        if self.n_features() != other.n_features() {
            return Err(PipelineError::InvalidInput {
                expected: self.n_features(),
                actual: other.n_features(),
            });
        }
        let features = ndarray::concatenate(Axis(0), &[self.features.view(), other.features.view()])
            .map_err(|e| PipelineError::InvalidParameter(e.to_string()))?;
        let labels = ndarray::concatenate(Axis(0), &[self.labels.view(), other.labels.view()])
            .map_err(|e| PipelineError::InvalidParameter(e.to_string()))?;
        Ok(Self { features, labels })
    }

    /// Split into `(train, test)` keeping the class ratio in both parts.
    ///
    /// Each class contributes `round(count * test_fraction)` rows to the test
    /// set. Row choice and output order are driven by `seed`.
    pub fn stratified_split(&self, test_fraction: f64, seed: u64) -> PipelineResult<(Self, Self)> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "split fraction must be in (0, 1), got {}",
                test_fraction
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let (mut fraud, mut legitimate): (Vec<usize>, Vec<usize>) =
            (0..self.len()).partition(|&i| self.labels[i] >= 0.5);

        let mut train_idx = Vec::with_capacity(self.len());
        let mut test_idx = Vec::new();

        for group in [&mut legitimate, &mut fraud] {
            group.shuffle(&mut rng);
            let n_test = (group.len() as f64 * test_fraction).round() as usize;
            test_idx.extend_from_slice(&group[..n_test]);
            train_idx.extend_from_slice(&group[n_test..]);
        }

        if train_idx.is_empty() || test_idx.is_empty() {
            return Err(PipelineError::InvalidParameter(format!(
                "split of {} rows at fraction {} leaves an empty side",
                self.len(),
                test_fraction
            )));
        }

        train_idx.shuffle(&mut rng);
        test_idx.shuffle(&mut rng);

        Ok((self.select(&train_idx), self.select(&test_idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::Class;

    fn imbalanced(legit: usize, fraud: usize) -> Dataset {
        let mut transactions = Vec::new();
        for i in 0..legit {
            transactions.push(Transaction::new([i as f64; FEATURE_COUNT], Class::Legitimate));
        }
        for i in 0..fraud {
            transactions.push(Transaction::new([-(i as f64) - 1.0; FEATURE_COUNT], Class::Fraud));
        }
        Dataset::from_transactions(&transactions).unwrap()
    }

    #[test]
    fn test_class_counts() {
        let dataset = imbalanced(90, 10);
        let counts = dataset.class_counts();
        assert_eq!(counts.legitimate, 90);
        assert_eq!(counts.fraud, 10);
        assert!((counts.fraud_ratio() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_stratified_split_preserves_ratio() {
        let dataset = imbalanced(10_000, 20);
        let (train, test) = dataset.stratified_split(0.2, 42).unwrap();

        assert_eq!(train.len() + test.len(), dataset.len());
        assert_eq!(test.class_counts().fraud, 4);
        assert_eq!(train.class_counts().fraud, 16);
        assert!(
            (train.class_counts().fraud_ratio() - test.class_counts().fraud_ratio()).abs() < 1e-3
        );
    }

    #[test]
    fn test_stratified_split_is_partition() {
        let dataset = imbalanced(50, 7);
        let (train, test) = dataset.stratified_split(0.3, 7).unwrap();

        // Every row value is unique, so collect and compare the first column.
        let mut seen: Vec<f64> = train
            .features
            .column(0)
            .iter()
            .chain(test.features.column(0).iter())
            .copied()
            .collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut expected: Vec<f64> = dataset.features.column(0).to_vec();
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_stratified_split_is_reproducible() {
        let dataset = imbalanced(200, 10);
        let (train_a, test_a) = dataset.stratified_split(0.2, 42).unwrap();
        let (train_b, test_b) = dataset.stratified_split(0.2, 42).unwrap();
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn test_invalid_fraction() {
        let dataset = imbalanced(10, 2);
        assert!(dataset.stratified_split(0.0, 1).is_err());
        assert!(dataset.stratified_split(1.0, 1).is_err());
    }

    #[test]
    fn test_concat() {
        let a = imbalanced(3, 1);
        let b = imbalanced(2, 2);
        let joined = a.concat(&b).unwrap();
        assert_eq!(joined.len(), 8);
        assert_eq!(joined.class_counts().fraud, 3);
    }
}
