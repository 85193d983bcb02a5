//! Thresholded classification metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::types::prediction::classify;
use crate::types::transaction::Class;

/// 2x2 confusion matrix with fraud as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    /// Count outcomes after labelling every score `>= threshold` as fraud.
    pub fn from_scores(labels: &Array1<f64>, scores: &Array1<f64>, threshold: f64) -> Self {
        let mut cm = Self::default();
        for (&y, &p) in labels.iter().zip(scores.iter()) {
            let actual = y >= 0.5;
            let predicted = classify(p, threshold) == Class::Fraud;
            match (actual, predicted) {
                (true, true) => cm.tp += 1,
                (false, false) => cm.tn += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// Precision for the fraud class
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// Recall for the fraud class
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1_score(&self) -> f64 {
        f1(self.precision(), self.recall())
    }

    /// Metrics for one class, treating that class as positive
    pub fn class_metrics(&self, class: Class) -> ClassMetrics {
        let (tp, fp, fn_) = match class {
            Class::Fraud => (self.tp, self.fp, self.fn_),
            Class::Legitimate => (self.tn, self.fn_, self.fp),
        };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        ClassMetrics {
            precision,
            recall,
            f1_score: f1(precision, recall),
            support: tp + fn_,
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Precision, recall, F1 and support for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class breakdown with accuracy and averaged metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub legitimate: ClassMetrics,
    pub fraud: ClassMetrics,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        let legitimate = cm.class_metrics(Class::Legitimate);
        let fraud = cm.class_metrics(Class::Fraud);
        let support = legitimate.support + fraud.support;

        let macro_avg = ClassMetrics {
            precision: (legitimate.precision + fraud.precision) / 2.0,
            recall: (legitimate.recall + fraud.recall) / 2.0,
            f1_score: (legitimate.f1_score + fraud.f1_score) / 2.0,
            support,
        };

        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if support == 0 {
                0.0
            } else {
                (f(&legitimate) * legitimate.support as f64 + f(&fraud) * fraud.support as f64)
                    / support as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1_score: weighted(|m| m.f1_score),
            support,
        };

        Self {
            legitimate,
            fraud,
            accuracy: cm.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }

    /// Tabular text rendering
    pub fn render(&self) -> String {
        let mut out = format!(
            "{:>14} {:>10} {:>10} {:>10} {:>10}\n\n",
            "", "precision", "recall", "f1-score", "support"
        );
        for (name, m) in [
            (Class::Legitimate.label(), &self.legitimate),
            (Class::Fraud.label(), &self.fraud),
        ] {
            out.push_str(&row(name, m));
        }
        out.push('\n');
        out.push_str(&format!(
            "{:>14} {:>10} {:>10} {:>10.4} {:>10}\n",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        ));
        out.push_str(&row("macro avg", &self.macro_avg));
        out.push_str(&row("weighted avg", &self.weighted_avg));
        out
    }
}

fn row(name: &str, m: &ClassMetrics) -> String {
    format!(
        "{:>14} {:>10.4} {:>10.4} {:>10.4} {:>10}\n",
        name, m.precision, m.recall, m.f1_score, m.support
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> ConfusionMatrix {
        let labels = Array1::from_vec(vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let scores = Array1::from_vec(vec![0.1, 0.2, 0.7, 0.3, 0.9, 0.5, 0.2]);
        ConfusionMatrix::from_scores(&labels, &scores, 0.5)
    }

    #[test]
    fn test_confusion_matrix_counts() {
        let cm = sample();
        assert_eq!(cm.tn, 3);
        assert_eq!(cm.fp, 1);
        assert_eq!(cm.fn_, 1);
        // 0.5 sits on the threshold and counts as fraud
        assert_eq!(cm.tp, 2);
        assert_eq!(cm.total(), 7);
    }

    #[test]
    fn test_binary_metrics() {
        let cm = sample();
        assert_relative_eq!(cm.accuracy(), 5.0 / 7.0);
        assert_relative_eq!(cm.precision(), 2.0 / 3.0);
        assert_relative_eq!(cm.recall(), 2.0 / 3.0);
        assert_relative_eq!(cm.f1_score(), 2.0 / 3.0);
    }

    #[test]
    fn test_no_positive_predictions() {
        let labels = Array1::from_vec(vec![0.0, 1.0]);
        let scores = Array1::from_vec(vec![0.1, 0.2]);
        let cm = ConfusionMatrix::from_scores(&labels, &scores, 0.5);
        assert_eq!(cm.precision(), 0.0);
        assert_eq!(cm.recall(), 0.0);
        assert_eq!(cm.f1_score(), 0.0);
    }

    #[test]
    fn test_report_averages() {
        let report = ClassificationReport::from_confusion_matrix(&sample());

        assert_eq!(report.legitimate.support, 4);
        assert_eq!(report.fraud.support, 3);
        assert_relative_eq!(report.legitimate.precision, 0.75);
        assert_relative_eq!(report.legitimate.recall, 0.75);
        assert_relative_eq!(
            report.macro_avg.precision,
            (0.75 + 2.0 / 3.0) / 2.0
        );
        assert_relative_eq!(
            report.weighted_avg.recall,
            (0.75 * 4.0 + 2.0 / 3.0 * 3.0) / 7.0
        );
        assert_eq!(report.weighted_avg.support, 7);
    }

    #[test]
    fn test_render_lists_classes() {
        let text = ClassificationReport::from_confusion_matrix(&sample()).render();
        assert!(text.contains("Legitimate"));
        assert!(text.contains("Fraud"));
        assert!(text.contains("weighted avg"));
    }
}
