//! Churn inference pipeline: feature generation, encoding, and ONNX scoring

use crate::config::ModelConfig;
use crate::error::PipelineError;
use crate::feature_generator::FeatureGenerator;
use crate::models::loader::{LoadedModel, ModelLoader};
use crate::types::frame::FeatureFrame;
use crate::types::prediction::{ChurnLabel, Prediction};
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// Feature schema the model was trained on.
///
/// Holds the column order of the exported feature vector and the category
/// tables used to label-encode the categorical columns. Encoding is done
/// by column name, never by position in the incoming frame.
pub struct FeatureSchema {
    columns: &'static [&'static str],
}

/// Column order of the training feature vector. `HasBalance` is produced
/// by the feature generator, not the request mapping.
const MODEL_COLUMNS: [&str; 13] = [
    "CreditScore",
    "Geography",
    "Gender",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
    "SatisfactionScore",
    "Complain",
    "HasBalance",
];

/// Training-time category tables. Values arriving here are already
/// title-cased by the feature generator.
const GEOGRAPHY_CATEGORIES: [&str; 3] = ["France", "Germany", "Spain"];
const GENDER_CATEGORIES: [&str; 2] = ["Female", "Male"];

impl FeatureSchema {
    pub fn new() -> Self {
        Self {
            columns: &MODEL_COLUMNS,
        }
    }

    /// Number of features in the encoded vector
    pub fn feature_count(&self) -> usize {
        self.columns.len()
    }

    /// Feature names in training order
    pub fn feature_names(&self) -> &[&'static str] {
        self.columns
    }

    /// Encode every row of a transformed frame into model feature vectors.
    ///
    /// A missing column or a category outside the training tables is an
    /// error; the encoder rejects unknowns rather than guessing.
    pub fn encode(&self, frame: &FeatureFrame) -> Result<Vec<Vec<f32>>, PipelineError> {
        let mut rows = vec![Vec::with_capacity(self.columns.len()); frame.num_rows()];

        for &column in self.columns {
            let values = frame
                .column(column)
                .ok_or_else(|| PipelineError::MissingColumn(column.to_string()))?;

            for (row, value) in rows.iter_mut().zip(values) {
                let encoded = match column {
                    "Geography" => encode_category(column, &value.to_text(), &GEOGRAPHY_CATEGORIES)?,
                    "Gender" => encode_category(column, &value.to_text(), &GENDER_CATEGORIES)?,
                    _ => value.as_f64().ok_or_else(|| PipelineError::NonNumericValue {
                        column: column.to_string(),
                        value: value.to_text(),
                    })? as f32,
                };
                row.push(encoded);
            }
        }

        Ok(rows)
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_category(
    column: &str,
    value: &str,
    categories: &[&str],
) -> Result<f32, PipelineError> {
    categories
        .iter()
        .position(|c| *c == value)
        .map(|i| i as f32)
        .ok_or_else(|| PipelineError::UnknownCategory {
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// The complete inference pipeline loaded from the model artifact.
///
/// Bundles the feature generator, the feature schema, and the ONNX
/// session into the single prediction path the model was trained with.
/// Loaded once at startup and shared read-only across requests.
pub struct ChurnPipeline {
    /// Loaded ONNX model (RwLock because `Session::run` needs `&mut`)
    model: RwLock<LoadedModel>,
    /// Preprocessing step, identical to training
    generator: FeatureGenerator,
    /// Feature vector layout and category tables
    schema: FeatureSchema,
    /// Probability cutoff for the churn class
    threshold: f64,
}

impl ChurnPipeline {
    /// Load the pipeline from configuration
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.onnx_threads)?;
        let model = loader.load_model(&config.path)?;

        let pipeline = Self {
            model: RwLock::new(model),
            generator: FeatureGenerator::new(),
            schema: FeatureSchema::new(),
            threshold: config.threshold,
        };

        info!(
            features = pipeline.schema.feature_count(),
            threshold = pipeline.threshold,
            "Churn pipeline initialized"
        );

        Ok(pipeline)
    }

    /// Decision threshold for the churn class
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Feature schema used by this pipeline
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Run one record through the full pipeline.
    ///
    /// The frame must hold exactly one row; use `predict_batch` otherwise.
    pub fn predict(&self, frame: &FeatureFrame) -> Result<Prediction> {
        anyhow::ensure!(
            frame.num_rows() == 1,
            "expected a single-row record, got {} rows",
            frame.num_rows()
        );

        let mut predictions = self.predict_batch(frame)?;
        predictions
            .pop()
            .context("pipeline produced no prediction for a one-row record")
    }

    /// Run every row of a frame through the full pipeline
    pub fn predict_batch(&self, frame: &FeatureFrame) -> Result<Vec<Prediction>> {
        let transformed = self.generator.transform(frame);
        let encoded = self
            .schema
            .encode(&transformed)
            .context("failed to encode record for the model")?;

        let mut predictions = Vec::with_capacity(encoded.len());
        for features in &encoded {
            let probability = self.run_model(features)?;
            let class = (probability >= self.threshold) as u8;

            debug!(
                probability = probability,
                class = class,
                "Pipeline inference complete"
            );

            predictions.push(Prediction {
                label: ChurnLabel::from_class(class),
                probability,
            });
        }

        Ok(predictions)
    }

    /// Run the ONNX model on an encoded feature vector
    fn run_model(&self, features: &[f32]) -> Result<f64> {
        use ort::value::Tensor;

        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("Failed to create input tensor")?;

        let mut model = self
            .model
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let input_name = model.input_name.clone();
        let output_name = model.output_name.clone();

        let outputs = model.session.run(ort::inputs![&input_name => input_tensor])?;

        // Extract the churn-class probability
        self.extract_probability(&outputs, &output_name)
    }

    /// Extract the class-1 probability from model output.
    /// Handles both tensor outputs and seq(map) outputs, the format
    /// scikit-learn ONNX exports use for probabilities.
    fn extract_probability(
        &self,
        outputs: &ort::session::SessionOutputs,
        output_name: &str,
    ) -> Result<f64> {
        // First, try to get the probabilities output by name
        if let Some(output) = outputs.get(output_name) {
            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = self.positive_prob_from_tensor(&shape, data);
                debug!(prob = prob, "Extracted from tensor");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = self.extract_from_sequence_map(output) {
                    return Ok(prob);
                }
            }
        }

        // Fallback: iterate all outputs and try extraction
        for (name, output) in outputs.iter() {
            // Skip "label" output
            if name.contains("label") {
                continue;
            }

            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = self.positive_prob_from_tensor(&shape, data);
                debug!(output = %name, prob = prob, "Extracted from tensor (fallback)");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = self.extract_from_sequence_map(&output) {
                    return Ok(prob);
                }
            }
        }

        warn!("Could not extract probability, using default 0.5");
        Ok(0.5)
    }

    /// Extract probability from seq(map(int64, float)) format
    fn extract_from_sequence_map(&self, output: &ort::value::DynValue) -> Result<f64> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

        if maps.is_empty() {
            return Err(anyhow::anyhow!("Empty sequence"));
        }

        // One map per row; the session runs with batch_size=1
        let map_value = &maps[0];
        let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

        // Class 1 is the churn class
        for (class_id, prob) in &kv_pairs {
            if *class_id == 1 {
                debug!(prob = *prob, "Extracted from seq(map)");
                return Ok(*prob as f64);
            }
        }

        for (class_id, prob) in &kv_pairs {
            if *class_id == 0 {
                return Ok(1.0 - *prob as f64);
            }
        }

        Err(anyhow::anyhow!("No probability found in map"))
    }

    /// Extract the class-1 probability from tensor data
    fn positive_prob_from_tensor(&self, shape: &ort::tensor::Shape, data: &[f32]) -> f64 {
        let dims: Vec<i64> = shape.iter().copied().collect();

        if dims.len() == 2 {
            let num_classes = dims[1] as usize;
            if num_classes >= 2 {
                // [batch, num_classes] - class 1 probability
                return data[1] as f64;
            } else if num_classes == 1 {
                // [batch, 1] - single probability
                return data[0] as f64;
            }
        } else if dims.len() == 1 {
            let num_classes = dims[0] as usize;
            if num_classes >= 2 {
                return data[1] as f64;
            } else if num_classes == 1 {
                return data[0] as f64;
            }
        }

        // Fallback: return last value
        data.last().map(|&v| v as f64).unwrap_or(0.5)
    }
}
