//! Held-out evaluation: confusion matrix, per-class report, ROC-AUC and PR-AUC

pub mod classification;
pub mod curves;
pub mod evaluator;

pub use classification::{ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use curves::{average_precision, precision_recall_curve, roc_auc, roc_curve};
pub use evaluator::{evaluate, evaluate_scores, EvaluationReport};
