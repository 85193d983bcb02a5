//! End-to-end training run: load, summarize, split, scale, rebalance, fit,
//! evaluate and persist.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::artifacts::write_json;
use crate::config::{AppConfig, ImbalanceStrategy};
use crate::data::{load_dataset, Dataset, DatasetSummary};
use crate::evaluation::{evaluate, EvaluationReport};
use crate::feature_extractor::FEATURE_NAMES;
use crate::metrics::PipelineMetrics;
use crate::models::{NeuralNetwork, Trainer, TrainingConfig, TrainingHistory};
use crate::preprocessing::StandardScaler;
use crate::sampling::{ClassWeights, Smote};

/// Everything a run produced, written to `artifacts.report_path`
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub summary: DatasetSummary,
    pub train_rows: usize,
    pub validation_rows: usize,
    pub test_rows: usize,
    pub imbalance_strategy: String,
    /// Present when class weighting was active
    pub class_weights: Option<ClassWeights>,
    /// Rows actually fitted on, after oversampling
    pub fitted_rows: usize,
    pub history: TrainingHistory,
    pub evaluation: EvaluationReport,
    pub scaler_path: PathBuf,
    pub checkpoint_path: PathBuf,
}

/// Scaled training inputs ready for the trainer
struct PreparedData {
    fit: Dataset,
    validation: Dataset,
    test: Dataset,
    class_weights: Option<ClassWeights>,
}

/// Run the whole pipeline with `config`
pub fn run(config: &AppConfig) -> Result<PipelineReport> {
    let mut metrics = PipelineMetrics::new();
    let seed = config.split.seed;

    let started = Instant::now();
    let dataset = load_dataset(&config.data.path)
        .with_context(|| format!("Failed to load dataset from {}", config.data.path.display()))?;
    let summary = DatasetSummary::from_dataset(&dataset);
    summary.log();
    metrics.record_stage("load", started.elapsed());

    let started = Instant::now();
    let (train, test) = dataset
        .stratified_split(config.split.test_fraction, seed)
        .context("Failed to split dataset")?;
    info!(
        train_rows = train.len(),
        train_fraud = train.class_counts().fraud,
        test_rows = test.len(),
        test_fraud = test.class_counts().fraud,
        "Stratified split"
    );
    let prepared = prepare(config, &train, &test)?;
    metrics.record_stage("preprocess", started.elapsed());

    let started = Instant::now();
    let mut network = NeuralNetwork::fraud_detector(prepared.fit.n_features(), seed);
    network.summary();
    let trainer = Trainer::new(TrainingConfig::from_settings(
        &config.training,
        seed,
        Some(config.artifacts.checkpoint_path.clone()),
    ));
    let history = trainer
        .fit(
            &mut network,
            &prepared.fit,
            &prepared.validation,
            prepared.class_weights.as_ref(),
        )
        .context("Training failed")?;
    metrics.record_stage("train", started.elapsed());

    let started = Instant::now();
    let threshold = config.detection.threshold;
    let evaluation = evaluate(&network, &prepared.test.features, &prepared.test.labels, threshold)
        .context("Evaluation failed")?;
    evaluation.log();
    metrics.record_scores(&network.predict_proba(&prepared.test.features), threshold);
    metrics.record_stage("evaluate", started.elapsed());

    let report = PipelineReport {
        summary,
        train_rows: train.len(),
        validation_rows: prepared.validation.len(),
        test_rows: test.len(),
        imbalance_strategy: format!("{:?}", config.imbalance.strategy),
        class_weights: prepared.class_weights,
        fitted_rows: prepared.fit.len(),
        history,
        evaluation,
        scaler_path: config.artifacts.scaler_path.clone(),
        checkpoint_path: config.artifacts.checkpoint_path.clone(),
    };
    write_report(&report, &config.artifacts.report_path)?;

    metrics.print_summary();
    Ok(report)
}

/// Fit and persist the scaler, carve out validation rows and apply the
/// imbalance strategy to what remains.
fn prepare(config: &AppConfig, train: &Dataset, test: &Dataset) -> Result<PreparedData> {
    let seed = config.split.seed;

    let scaler = StandardScaler::fit(&train.features, &FEATURE_NAMES).context("Failed to fit scaler")?;
    scaler
        .save(&config.artifacts.scaler_path)
        .with_context(|| format!("Failed to save scaler to {}", config.artifacts.scaler_path.display()))?;
    info!(path = %config.artifacts.scaler_path.display(), "Saved scaler state");

    let scaled_train = Dataset::new(scaler.transform(&train.features)?, train.labels.clone())?;
    let test = Dataset::new(scaler.transform(&test.features)?, test.labels.clone())?;

    let (fit, validation) = scaled_train
        .stratified_split(config.training.validation_fraction, seed)
        .context("Failed to split validation set")?;

    let (fit, class_weights) = match config.imbalance.strategy {
        ImbalanceStrategy::ClassWeight => {
            let weights = ClassWeights::balanced(train.class_counts()).context("Failed to compute class weights")?;
            info!(
                legitimate = format!("{:.4}", weights.legitimate),
                fraud = format!("{:.4}", weights.fraud),
                "Class weights"
            );
            (fit, Some(weights))
        }
        ImbalanceStrategy::Oversample => {
            let resampled = Smote::new(config.imbalance.k_neighbors, seed)
                .fit_resample(&fit)
                .context("Oversampling failed")?;
            (resampled, None)
        }
        ImbalanceStrategy::None => (fit, None),
    };

    Ok(PreparedData {
        fit,
        validation,
        test,
        class_weights,
    })
}

fn write_report(report: &PipelineReport, path: &Path) -> Result<()> {
    write_json(path, report).with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!(path = %path.display(), "Wrote run report");
    Ok(())
}
