//! Dataset loading, splitting and exploratory statistics

pub mod dataset;
pub mod loader;
pub mod summary;

pub use dataset::{ClassCounts, Dataset};
pub use loader::{load_dataset, load_transactions, write_transactions};
pub use summary::DatasetSummary;
