//! End-to-end runs of the training pipeline on synthetic data

use approx::assert_relative_eq;
use fraud_detection_trainer::config::{AppConfig, ImbalanceStrategy, WeightSelection};
use fraud_detection_trainer::data::{load_dataset, write_transactions};
use fraud_detection_trainer::feature_extractor::FEATURE_COUNT;
use fraud_detection_trainer::models::Checkpoint;
use fraud_detection_trainer::pipeline;
use fraud_detection_trainer::types::transaction::{Class, Transaction};
use fraud_detection_trainer::{predict_transaction, FraudPredictor, StandardScaler};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tempfile::TempDir;

fn random_transactions(legitimate: usize, fraud: usize, seed: u64) -> Vec<Transaction> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(legitimate + fraud);
    for i in 0..legitimate + fraud {
        let mut features = [0.0; FEATURE_COUNT];
        for v in features.iter_mut() {
            *v = rng.gen_range(-3.0..3.0);
        }
        let class = if i < legitimate { Class::Legitimate } else { Class::Fraud };
        rows.push(Transaction::new(features, class));
    }
    rows
}

fn test_config(dir: &Path, data: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.data.path = data.to_path_buf();
    config.training.epochs = 3;
    config.artifacts.scaler_path = dir.join("artifacts/scaler.json");
    config.artifacts.checkpoint_path = dir.join("artifacts/best_model.json");
    config.artifacts.report_path = dir.join("artifacts/report.json");
    config
}

fn write_dataset(legitimate: usize, fraud: usize) -> (TempDir, AppConfig) {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("transactions.csv");
    write_transactions(&data, &random_transactions(legitimate, fraud, 42)).unwrap();
    let config = test_config(dir.path(), &data);
    (dir, config)
}

#[test]
fn test_end_to_end_class_weighting() {
    let (_dir, config) = write_dataset(10_000, 20);
    let report = pipeline::run(&config).unwrap();

    // Stratified 80/20 split keeps ~4 fraud rows in test
    let test_fraud = report.evaluation.classification.fraud.support;
    assert!((3..=5).contains(&test_fraud));
    assert_eq!(report.train_rows + report.test_rows, 10_020);

    // N / (2 * count) on the 8016-row training split
    let weights = report.class_weights.unwrap();
    assert_relative_eq!(weights.fraud, 8016.0 / 32.0, epsilon = 1e-9);
    assert_relative_eq!(weights.legitimate, 8016.0 / 16_000.0, epsilon = 1e-9);
    assert_relative_eq!(weights.fraud / weights.legitimate, 500.0, epsilon = 1e-9);

    assert_eq!(report.evaluation.confusion_matrix.total(), report.test_rows);
    assert!(report.history.epochs_run() <= 3);
    assert!(config.artifacts.report_path.exists());
}

#[test]
fn test_artifacts_round_trip() {
    let (_dir, config) = write_dataset(2_000, 40);
    let report = pipeline::run(&config).unwrap();

    let scaler = StandardScaler::load(&config.artifacts.scaler_path).unwrap();
    let checkpoint = Checkpoint::load(&config.artifacts.checkpoint_path).unwrap();
    assert_eq!(checkpoint.epoch, report.history.best_auc_epoch);
    assert_eq!(checkpoint.run_id, report.history.run_id);

    let predictor = FraudPredictor::from_artifacts(
        &config.artifacts.scaler_path,
        &config.artifacts.checkpoint_path,
        config.detection.threshold,
    )
    .unwrap();

    let dataset = load_dataset(&config.data.path).unwrap();
    let raw: Vec<f64> = dataset.features.row(0).to_vec();
    let first = predictor.predict(&raw).unwrap();
    let second = predictor.predict(&raw).unwrap();
    assert_eq!(first, second);

    let direct = predict_transaction(&raw, &scaler, &checkpoint.network, 0.5).unwrap();
    assert_eq!(direct, first);

    // A probability equal to the threshold is labelled fraud
    let at_boundary = predict_transaction(&raw, &scaler, &checkpoint.network, first.probability).unwrap();
    assert_eq!(at_boundary.label, "Fraud");
}

#[test]
fn test_end_to_end_oversampling() {
    let (_dir, mut config) = write_dataset(600, 30);
    config.imbalance.strategy = ImbalanceStrategy::Oversample;
    config.training.weight_selection = WeightSelection::ValLoss;
    config.training.epochs = 2;

    let report = pipeline::run(&config).unwrap();

    assert!(report.class_weights.is_none());
    // SMOTE balances the fit portion only
    assert!(report.fitted_rows > report.train_rows - report.validation_rows);
    assert_eq!(report.evaluation.confusion_matrix.total(), report.test_rows);
    assert_eq!(report.history.restored_epoch, Some(report.history.best_loss_epoch));
}

#[test]
fn test_missing_dataset_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &dir.path().join("absent.csv"));
    assert!(pipeline::run(&config).is_err());
}
