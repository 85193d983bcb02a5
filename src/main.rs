//! Fraud Detection Trainer - Main Entry Point
//!
//! `train` runs the full pipeline and persists the scaler and best model.
//! `predict` loads those artifacts and scores a single feature vector.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fraud_detection_trainer::{
    config::{AppConfig, LoggingConfig},
    models::inference::FraudPredictor,
    pipeline,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fraud-trainer")]
#[command(about = "Train and serve a credit card fraud classifier")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train, evaluate and persist the model
    Train {
        /// Configuration file
        #[arg(short, long, default_value = "config/config.toml")]
        config: PathBuf,

        /// Dataset CSV, overriding `data.path`
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Score one transaction with the persisted artifacts
    Predict {
        /// Configuration file
        #[arg(short, long, default_value = "config/config.toml")]
        config: PathBuf,

        /// 30 comma-separated values: Time, V1..V28, Amount
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        features: Vec<f64>,
    },
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Train { config, data } => {
            let mut config = AppConfig::load_from_path(&config)
                .with_context(|| format!("Failed to load configuration from {}", config.display()))?;
            if let Some(path) = data {
                config.data.path = path;
            }
            init_logging(&config.logging)?;

            info!("Starting Fraud Detection Trainer");
            info!(
                data = %config.data.path.display(),
                strategy = ?config.imbalance.strategy,
                epochs = config.training.epochs,
                threshold = config.detection.threshold,
                "Configuration loaded"
            );

            let report = pipeline::run(&config)?;
            info!(
                roc_auc = format!("{:.4}", report.evaluation.roc_auc),
                pr_auc = format!("{:.4}", report.evaluation.pr_auc),
                best_epoch = report.history.best_auc_epoch,
                "Training finished"
            );
        }
        Command::Predict { config, features } => {
            let config = AppConfig::load_from_path(&config)
                .with_context(|| format!("Failed to load configuration from {}", config.display()))?;
            init_logging(&config.logging)?;

            let predictor = FraudPredictor::from_artifacts(
                &config.artifacts.scaler_path,
                &config.artifacts.checkpoint_path,
                config.detection.threshold,
            )
            .context("Failed to load model artifacts")?;

            let result = predictor.predict(&features)?;
            println!("{}", serde_json::to_string(&result)?);
        }
    }

    Ok(())
}
