//! Threshold-independent ranking metrics
//!
//! All functions take 0/1 labels and fraud scores of equal length. Rows with
//! identical scores are treated as a single threshold. Scores are ranked by
//! IEEE total order, so a NaN score ranks above every finite score.

use std::cmp::Ordering;

use ndarray::Array1;

/// Sort `(score, is_positive)` pairs by descending score
fn ranked(labels: &Array1<f64>, scores: &Array1<f64>) -> Vec<(f64, bool)> {
    let mut pairs: Vec<(f64, bool)> = scores
        .iter()
        .zip(labels.iter())
        .map(|(&s, &y)| (s, y >= 0.5))
        .collect();
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));
    pairs
}

/// Cumulative `(tp, fp, threshold)` at every distinct score, highest first
fn cumulative_counts(pairs: &[(f64, bool)]) -> Vec<(f64, f64, f64)> {
    let mut points = Vec::new();
    let mut tp = 0.0;
    let mut fp = 0.0;
    let mut i = 0;

    while i < pairs.len() {
        let score = pairs[i].0;
        while i < pairs.len() && pairs[i].0.total_cmp(&score) == Ordering::Equal {
            if pairs[i].1 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            i += 1;
        }
        points.push((tp, fp, score));
    }
    points
}

/// ROC curve as `(fpr, tpr, thresholds)`, starting at `(0, 0)`.
///
/// Empty when either class is absent.
pub fn roc_curve(labels: &Array1<f64>, scores: &Array1<f64>) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let pairs = ranked(labels, scores);
    let n_pos = pairs.iter().filter(|(_, p)| *p).count() as f64;
    let n_neg = pairs.len() as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return (vec![], vec![], vec![]);
    }

    let mut fprs = vec![0.0];
    let mut tprs = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];

    for (tp, fp, score) in cumulative_counts(&pairs) {
        fprs.push(fp / n_neg);
        tprs.push(tp / n_pos);
        thresholds.push(score);
    }

    (fprs, tprs, thresholds)
}

/// Area under the ROC curve (trapezoidal rule).
///
/// Returns 0.5 when only one class is present.
pub fn roc_auc(labels: &Array1<f64>, scores: &Array1<f64>) -> f64 {
    let (fprs, tprs, _) = roc_curve(labels, scores);
    if fprs.is_empty() {
        return 0.5;
    }

    fprs.windows(2)
        .zip(tprs.windows(2))
        .map(|(f, t)| (f[1] - f[0]) * (t[1] + t[0]) / 2.0)
        .sum()
}

/// Precision-recall pairs at each distinct threshold, highest threshold first.
pub fn precision_recall_curve(
    labels: &Array1<f64>,
    scores: &Array1<f64>,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let pairs = ranked(labels, scores);
    let n_pos = pairs.iter().filter(|(_, p)| *p).count() as f64;

    let mut precisions = Vec::new();
    let mut recalls = Vec::new();
    let mut thresholds = Vec::new();

    for (tp, fp, score) in cumulative_counts(&pairs) {
        precisions.push(tp / (tp + fp));
        recalls.push(if n_pos > 0.0 { tp / n_pos } else { 0.0 });
        thresholds.push(score);
    }

    (precisions, recalls, thresholds)
}

/// Area under the precision-recall curve as average precision:
/// `sum((R_n - R_{n-1}) * P_n)`. Returns 0.0 without positives.
pub fn average_precision(labels: &Array1<f64>, scores: &Array1<f64>) -> f64 {
    let (precisions, recalls, _) = precision_recall_curve(labels, scores);
    let mut prev_recall = 0.0;
    let mut ap = 0.0;
    for (p, r) in precisions.iter().zip(recalls.iter()) {
        ap += (r - prev_recall) * p;
        prev_recall = *r;
    }
    ap
}
