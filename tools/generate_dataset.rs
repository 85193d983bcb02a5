//! Synthetic Dataset Generator
//!
//! Writes a CSV in the trainer's input format (`Time, V1..V28, Amount, Class`)
//! for smoke runs when the real dataset is not at hand.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fraud_detection_trainer::data::write_transactions;
use fraud_detection_trainer::feature_extractor::FEATURE_COUNT;
use fraud_detection_trainer::types::transaction::{Class, Transaction};
use ndarray_rand::rand_distr::{Distribution, Exp, Normal};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Two days of transactions, in seconds
const TIME_SPAN: f64 = 172_800.0;

/// Components shifted for fraud rows, as (index into V1..V28, shift)
const FRAUD_SHIFTS: [(usize, f64); 6] = [(3, 3.0), (9, -4.0), (11, -5.0), (13, -6.0), (16, -5.0), (10, 3.0)];

#[derive(Parser, Debug)]
#[command(name = "generate_dataset")]
#[command(about = "Generate a synthetic card transaction dataset")]
struct Args {
    /// Number of legitimate rows
    #[arg(long, default_value_t = 10_000)]
    legitimate: usize,

    /// Number of fraud rows
    #[arg(long, default_value_t = 20)]
    fraud: usize,

    /// Random seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Output CSV path
    #[arg(short, long, default_value = "data/creditcard.csv")]
    output: PathBuf,
}

/// Seeded transaction generator
struct TransactionGenerator {
    rng: ChaCha8Rng,
    component: Normal<f64>,
    legit_amount: Exp<f64>,
    fraud_amount: Exp<f64>,
}

impl TransactionGenerator {
    fn new(seed: u64) -> Result<Self> {
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            component: Normal::new(0.0, 1.0).context("Invalid normal distribution")?,
            legit_amount: Exp::new(1.0 / 88.0).context("Invalid amount distribution")?,
            fraud_amount: Exp::new(1.0 / 122.0).context("Invalid amount distribution")?,
        })
    }

    fn generate(&mut self, class: Class) -> Transaction {
        let mut features = [0.0; FEATURE_COUNT];
        features[0] = self.rng.gen_range(0.0..TIME_SPAN).floor();
        for v in features[1..FEATURE_COUNT - 1].iter_mut() {
            *v = self.component.sample(&mut self.rng);
        }

        let amount = match class {
            Class::Legitimate => self.legit_amount.sample(&mut self.rng),
            Class::Fraud => {
                for (component, shift) in FRAUD_SHIFTS {
                    features[1 + component] += shift;
                }
                self.fraud_amount.sample(&mut self.rng)
            }
        };
        features[FEATURE_COUNT - 1] = (amount * 100.0).round() / 100.0;

        Transaction::new(features, class)
    }

    /// Generate both classes, ordered by time as in the real export
    fn generate_rows(&mut self, legitimate: usize, fraud: usize) -> Vec<Transaction> {
        let mut transactions = Vec::with_capacity(legitimate + fraud);
        for _ in 0..legitimate {
            transactions.push(self.generate(Class::Legitimate));
        }
        for _ in 0..fraud {
            transactions.push(self.generate(Class::Fraud));
        }

        transactions.shuffle(&mut self.rng);
        transactions.sort_by(|a, b| a.time().total_cmp(&b.time()));
        transactions
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!(
        legitimate = args.legitimate,
        fraud = args.fraud,
        seed = args.seed,
        output = %args.output.display(),
        "Generating dataset"
    );

    let transactions = TransactionGenerator::new(args.seed)?.generate_rows(args.legitimate, args.fraud);

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    write_transactions(&args.output, &transactions)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(rows = transactions.len(), output = %args.output.display(), "Dataset written");
    Ok(())
}
