//! Class-imbalance handling: loss weighting and synthetic oversampling

pub mod class_weight;
pub mod smote;

pub use class_weight::ClassWeights;
pub use smote::Smote;
