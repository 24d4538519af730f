//! Type definitions for the churn prediction service

pub mod customer;
pub mod frame;
pub mod prediction;

pub use customer::CustomerRecord;
pub use frame::{FeatureFrame, Value};
pub use prediction::{ChurnLabel, Prediction, PredictionResponse};
