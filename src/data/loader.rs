//! CSV loader for the transactions dataset

use csv::{Reader, Writer};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::feature_extractor::{FeatureExtractor, FEATURE_NAMES, LABEL_COLUMN};
use crate::types::transaction::Transaction;

use super::dataset::Dataset;

/// Read all labelled transactions from a CSV file.
///
/// Rows with a missing or NaN `Class` value are dropped and counted.
pub fn load_transactions<P: AsRef<Path>>(path: P) -> PipelineResult<Vec<Transaction>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = Reader::from_reader(file);

    let extractor = FeatureExtractor::from_header(reader.headers()?)?;

    let mut transactions = Vec::new();
    let mut dropped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        match extractor.extract(&record, i + 1)? {
            Some(tx) => transactions.push(tx),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(
            dropped = dropped,
            path = %path.display(),
            "Dropped rows with missing class label"
        );
    }

    if transactions.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    info!(
        rows = transactions.len(),
        path = %path.display(),
        "Loaded transactions"
    );

    Ok(transactions)
}

/// Read a CSV file straight into a feature matrix and label vector.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> PipelineResult<Dataset> {
    let transactions = load_transactions(path)?;
    Dataset::from_transactions(&transactions)
}

/// Write transactions in the input format (`Time, V1..V28, Amount, Class`).
pub fn write_transactions<P: AsRef<Path>>(path: P, transactions: &[Transaction]) -> PipelineResult<()> {
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);

    let mut header: Vec<&str> = FEATURE_NAMES.to_vec();
    header.push(LABEL_COLUMN);
    writer.write_record(&header)?;

    for tx in transactions {
        let mut row: Vec<String> = tx.features.iter().map(|v| v.to_string()).collect();
        row.push(format!("{}", tx.class.as_target() as u8));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
