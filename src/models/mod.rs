//! Model loading and inference components

pub mod inference;
pub mod loader;

pub use inference::{ChurnPipeline, FeatureSchema};
pub use loader::ModelLoader;
