//! Churn Insight Service Library
//!
//! Serves a trained customer-churn classification model over HTTP. The
//! inference pipeline re-applies the training-time feature generation
//! before scoring records with the exported ONNX model.

pub mod config;
pub mod error;
pub mod feature_generator;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod types;

pub use config::AppConfig;
pub use error::{ApiError, PipelineError};
pub use feature_generator::FeatureGenerator;
pub use metrics::ServiceMetrics;
pub use models::ChurnPipeline;
pub use routes::AppState;
pub use types::{CustomerRecord, FeatureFrame, Prediction, PredictionResponse};
