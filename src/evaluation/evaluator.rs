//! Held-out test evaluation

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::classification::{ClassificationReport, ConfusionMatrix};
use super::curves::{average_precision, roc_auc};
use crate::error::{PipelineError, PipelineResult};
use crate::models::network::NeuralNetwork;

/// Metrics for one model on one labelled set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub threshold: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub classification: ClassificationReport,
    pub roc_auc: f64,
    /// Area under the precision-recall curve (average precision)
    pub pr_auc: f64,
}

/// Score `features` with the model and build the report at `threshold`.
///
/// `features` must already be scaled.
pub fn evaluate(
    model: &NeuralNetwork,
    features: &Array2<f64>,
    labels: &Array1<f64>,
    threshold: f64,
) -> PipelineResult<EvaluationReport> {
    if features.ncols() != model.input_size() {
        return Err(PipelineError::InvalidInput {
            expected: model.input_size(),
            actual: features.ncols(),
        });
    }
    if features.nrows() != labels.len() {
        return Err(PipelineError::InvalidParameter(format!(
            "feature rows ({}) and labels ({}) differ",
            features.nrows(),
            labels.len()
        )));
    }

    let scores = model.predict_proba(features);
    evaluate_scores(labels, &scores, threshold)
}

/// Build the report from precomputed fraud scores.
pub fn evaluate_scores(
    labels: &Array1<f64>,
    scores: &Array1<f64>,
    threshold: f64,
) -> PipelineResult<EvaluationReport> {
    if labels.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }
    if scores.len() != labels.len() {
        return Err(PipelineError::InvalidParameter(format!(
            "scores ({}) and labels ({}) differ",
            scores.len(),
            labels.len()
        )));
    }
    if !(0.0..=1.0).contains(&threshold) {
        return Err(PipelineError::InvalidParameter(format!(
            "threshold must be in [0, 1], got {}",
            threshold
        )));
    }

    let confusion_matrix = ConfusionMatrix::from_scores(labels, scores, threshold);
    Ok(EvaluationReport {
        samples: labels.len(),
        threshold,
        confusion_matrix,
        classification: ClassificationReport::from_confusion_matrix(&confusion_matrix),
        roc_auc: roc_auc(labels, scores),
        pr_auc: average_precision(labels, scores),
    })
}

impl EvaluationReport {
    /// Log the report at info level
    pub fn log(&self) {
        let cm = &self.confusion_matrix;
        info!(
            samples = self.samples,
            threshold = self.threshold,
            tn = cm.tn,
            fp = cm.fp,
            fn_ = cm.fn_,
            tp = cm.tp,
            "Confusion matrix"
        );
        info!(
            roc_auc = format!("{:.4}", self.roc_auc),
            pr_auc = format!("{:.4}", self.pr_auc),
            "Ranking metrics"
        );
        for line in self.classification.render().lines() {
            if !line.trim().is_empty() {
                info!("{}", line);
            }
        }
    }
}
