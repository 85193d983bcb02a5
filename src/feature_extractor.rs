//! Feature extraction from dataset rows and raw inference vectors.
//!
//! The model consumes 30 features in a fixed canonical order:
//! `Time`, `V1`..`V28`, `Amount`. Dataset columns are located by header name,
//! so files with a different column order produce identical feature vectors.

use csv::StringRecord;

use crate::error::{PipelineError, PipelineResult};
use crate::types::transaction::{Class, Transaction};

/// Number of model input features
pub const FEATURE_COUNT: usize = 30;

/// Name of the target column
pub const LABEL_COLUMN: &str = "Class";

/// Canonical feature order used for training and inference
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Time", "V1", "V2", "V3", "V4", "V5", "V6", "V7", "V8", "V9", "V10", "V11", "V12", "V13",
    "V14", "V15", "V16", "V17", "V18", "V19", "V20", "V21", "V22", "V23", "V24", "V25", "V26",
    "V27", "V28", "Amount",
];

/// Maps CSV columns onto the canonical feature vector.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    /// Source column index for each canonical feature
    feature_columns: [usize; FEATURE_COUNT],
    /// Source column index of the label
    label_column: usize,
}

impl FeatureExtractor {
    /// Resolve column positions from a CSV header row.
    pub fn from_header(header: &StringRecord) -> PipelineResult<Self> {
        let position = |name: &str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
        };

        let mut feature_columns = [0usize; FEATURE_COUNT];
        for (slot, name) in feature_columns.iter_mut().zip(FEATURE_NAMES.iter()) {
            *slot = position(name)?;
        }
        let label_column = position(LABEL_COLUMN)?;

        Ok(Self {
            feature_columns,
            label_column,
        })
    }

    /// Extract a transaction from a data row.
    ///
    /// Returns `Ok(None)` when the label is missing or NaN so the caller can
    /// drop the row. `row` is the 1-based data row number used in errors.
    pub fn extract(&self, record: &StringRecord, row: usize) -> PipelineResult<Option<Transaction>> {
        let class = match self.parse_label(record, row)? {
            Some(class) => class,
            None => return Ok(None),
        };

        let mut features = [0.0; FEATURE_COUNT];
        for (i, &column) in self.feature_columns.iter().enumerate() {
            let raw = record.get(column).unwrap_or("").trim();
            let value: f64 = raw.parse().map_err(|_| PipelineError::MalformedRow {
                row,
                column: FEATURE_NAMES[i].to_string(),
                value: raw.to_string(),
            })?;
            if !value.is_finite() {
                return Err(PipelineError::MalformedRow {
                    row,
                    column: FEATURE_NAMES[i].to_string(),
                    value: raw.to_string(),
                });
            }
            features[i] = value;
        }

        Ok(Some(Transaction::new(features, class)))
    }

    fn parse_label(&self, record: &StringRecord, row: usize) -> PipelineResult<Option<Class>> {
        let raw = record.get(self.label_column).unwrap_or("").trim();
        let value = match raw.parse::<f64>() {
            Ok(v) if v.is_nan() => return Ok(None),
            Ok(v) => v,
            Err(_) => return Ok(None),
        };

        Class::from_value(value)
            .map(Some)
            .ok_or_else(|| PipelineError::InvalidLabel {
                row,
                value: raw.to_string(),
            })
    }

    /// Validate a raw inference vector and copy it into canonical form.
    pub fn vector_from_slice(raw: &[f64]) -> PipelineResult<[f64; FEATURE_COUNT]> {
        if raw.len() != FEATURE_COUNT {
            return Err(PipelineError::InvalidInput {
                expected: FEATURE_COUNT,
                actual: raw.len(),
            });
        }

        let mut features = [0.0; FEATURE_COUNT];
        for (i, &value) in raw.iter().enumerate() {
            if !value.is_finite() {
                return Err(PipelineError::NonFiniteInput {
                    feature: FEATURE_NAMES[i].to_string(),
                    value,
                });
            }
            features[i] = value;
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kaggle_header() -> StringRecord {
        let mut names: Vec<&str> = FEATURE_NAMES.to_vec();
        names.push(LABEL_COLUMN);
        StringRecord::from(names)
    }

    fn row_with(label: &str) -> StringRecord {
        let mut values: Vec<String> = (0..FEATURE_COUNT).map(|i| format!("{}.5", i)).collect();
        values.push(label.to_string());
        StringRecord::from(values)
    }

    #[test]
    fn test_feature_extraction() {
        let extractor = FeatureExtractor::from_header(&kaggle_header()).unwrap();
        let tx = extractor.extract(&row_with("1"), 1).unwrap().unwrap();

        assert_eq!(tx.features[0], 0.5); // Time
        assert_eq!(tx.features[29], 29.5); // Amount
        assert_eq!(tx.class, Class::Fraud);
    }

    #[test]
    fn test_reordered_columns() {
        // Time, Amount, V1..V28, Class
        let mut names = vec!["Time", "Amount"];
        names.extend_from_slice(&FEATURE_NAMES[1..29]);
        names.push(LABEL_COLUMN);
        let header = StringRecord::from(names);

        let mut values = vec!["10".to_string(), "99.9".to_string()];
        values.extend((1..29).map(|i| i.to_string()));
        values.push("0".to_string());

        let extractor = FeatureExtractor::from_header(&header).unwrap();
        let tx = extractor.extract(&StringRecord::from(values), 1).unwrap().unwrap();

        assert_eq!(tx.time(), 10.0);
        assert_eq!(tx.amount(), 99.9);
        assert_eq!(tx.features[1], 1.0); // V1
        assert_eq!(tx.class, Class::Legitimate);
    }

    #[test]
    fn test_missing_column() {
        let header = StringRecord::from(vec!["Time", "Amount", "Class"]);
        let err = FeatureExtractor::from_header(&header).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(ref c) if c == "V1"));
    }

    #[test]
    fn test_missing_label_is_dropped() {
        let extractor = FeatureExtractor::from_header(&kaggle_header()).unwrap();
        assert!(extractor.extract(&row_with(""), 3).unwrap().is_none());
        assert!(extractor.extract(&row_with("NaN"), 4).unwrap().is_none());
    }

    #[test]
    fn test_invalid_label_value() {
        let extractor = FeatureExtractor::from_header(&kaggle_header()).unwrap();
        let err = extractor.extract(&row_with("2"), 7).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidLabel { row: 7, .. }));
    }

    #[test]
    fn test_malformed_feature() {
        let extractor = FeatureExtractor::from_header(&kaggle_header()).unwrap();
        let mut record: Vec<String> = row_with("0").iter().map(String::from).collect();
        record[3] = "abc".to_string();
        let err = extractor
            .extract(&StringRecord::from(record), 2)
            .unwrap_err();
        assert!(matches!(err, PipelineError::MalformedRow { row: 2, ref column, .. } if column == "V3"));
    }

    #[test]
    fn test_vector_from_slice_dimension_mismatch() {
        let err = FeatureExtractor::vector_from_slice(&[0.0; 29]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidInput {
                expected: 30,
                actual: 29
            }
        ));

        let mut raw = [1.0; FEATURE_COUNT];
        raw[5] = f64::INFINITY;
        assert!(matches!(
            FeatureExtractor::vector_from_slice(&raw),
            Err(PipelineError::NonFiniteInput { .. })
        ));
    }
}
