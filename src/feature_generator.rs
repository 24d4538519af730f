//! Feature generation for churn model inference.
//!
//! This module re-applies the preprocessing the churn model was trained
//! with: a derived balance indicator and casing normalization of the
//! categorical columns. It must stay byte-for-byte consistent with the
//! training pipeline or predictions silently diverge.

use crate::types::frame::{FeatureFrame, Value};

/// Stateless transformer applied to every record before encoding.
///
/// The transformer is part of the inference pipeline, not service-layer
/// preprocessing: training and serving run the identical step. It holds no
/// state, so a single instance is safe to share across concurrent requests.
pub struct FeatureGenerator;

impl FeatureGenerator {
    /// Create a new feature generator.
    pub fn new() -> Self {
        Self
    }

    /// Transform a record, returning a new frame.
    ///
    /// The input is never mutated, row count is preserved, and the
    /// operation is idempotent.
    ///
    /// - If a `Balance` column is present, a `HasBalance` column is added
    ///   with 1 where `Balance > 0` and 0 otherwise. Without `Balance` no
    ///   column is added.
    /// - `Geography` and `Gender`, when present, are converted to strings
    ///   and title-cased.
    pub fn transform(&self, frame: &FeatureFrame) -> FeatureFrame {
        let mut out = frame.clone();

        if let Some(balance) = frame.column("Balance") {
            let flags: Vec<Value> = balance
                .iter()
                .map(|v| {
                    let positive = v.as_f64().map(|b| b > 0.0).unwrap_or(false);
                    Value::Int(positive as i64)
                })
                .collect();
            // Row count matches the source column, insert cannot fail
            let _ = out.insert("HasBalance", flags);
        }

        for col in ["Geography", "Gender"] {
            if let Some(values) = out.column(col) {
                let cased: Vec<Value> = values
                    .iter()
                    .map(|v| Value::Text(title_case(&v.to_text())))
                    .collect();
                let _ = out.insert(col, cased);
            }
        }

        out
    }
}

impl Default for FeatureGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Uppercase the first letter of each whitespace-delimited word and
/// lowercase the rest. Whitespace is preserved as-is.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if c.is_whitespace() {
            out.push(c);
            at_word_start = true;
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_balances(balances: Vec<Value>) -> FeatureFrame {
        let mut frame = FeatureFrame::new();
        frame.insert("Balance", balances).unwrap();
        frame
    }

    #[test]
    fn test_has_balance_derivation() {
        let generator = FeatureGenerator::new();
        let frame = frame_with_balances(vec![
            Value::Float(2500.75),
            Value::Float(0.0),
            Value::Float(-10.0),
            Value::Int(1),
        ]);

        let out = generator.transform(&frame);

        assert_eq!(
            out.column("HasBalance").unwrap(),
            &[
                Value::Int(1),
                Value::Int(0),
                Value::Int(0),
                Value::Int(1)
            ]
        );
        // Original column survives untouched
        assert_eq!(out.column("Balance"), frame.column("Balance"));
    }

    #[test]
    fn test_no_balance_no_indicator() {
        let generator = FeatureGenerator::new();
        let mut frame = FeatureFrame::new();
        frame
            .insert("Age", vec![Value::Int(40), Value::Int(25)])
            .unwrap();

        let out = generator.transform(&frame);

        assert!(!out.contains("HasBalance"));
        assert_eq!(out.num_rows(), 2);
        assert_eq!(out.num_columns(), 1);
    }

    #[test]
    fn test_title_casing() {
        assert_eq!(title_case("GERMANY"), "Germany");
        assert_eq!(title_case("germany"), "Germany");
        assert_eq!(title_case("san marino"), "San Marino");
        assert_eq!(title_case("fRaNcE"), "France");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_categorical_casing_in_frame() {
        let generator = FeatureGenerator::new();
        let mut frame = FeatureFrame::new();
        frame
            .insert(
                "Geography",
                vec![
                    Value::Text("FRANCE".to_string()),
                    Value::Text("spain".to_string()),
                ],
            )
            .unwrap();
        frame
            .insert(
                "Gender",
                vec![
                    Value::Text("male".to_string()),
                    Value::Text("FEMALE".to_string()),
                ],
            )
            .unwrap();

        let out = generator.transform(&frame);

        assert_eq!(
            out.column("Geography").unwrap(),
            &[
                Value::Text("France".to_string()),
                Value::Text("Spain".to_string())
            ]
        );
        assert_eq!(
            out.column("Gender").unwrap(),
            &[
                Value::Text("Male".to_string()),
                Value::Text("Female".to_string())
            ]
        );
    }

    #[test]
    fn test_non_string_values_are_stringified() {
        let generator = FeatureGenerator::new();
        let mut frame = FeatureFrame::new();
        frame.insert("Geography", vec![Value::Int(42)]).unwrap();

        let out = generator.transform(&frame);

        assert_eq!(
            out.column("Geography").unwrap(),
            &[Value::Text("42".to_string())]
        );
    }

    #[test]
    fn test_idempotence() {
        let generator = FeatureGenerator::new();
        let mut frame = FeatureFrame::new();
        frame
            .insert("Balance", vec![Value::Float(100.0), Value::Float(0.0)])
            .unwrap();
        frame
            .insert(
                "Geography",
                vec![
                    Value::Text("gErMaNy".to_string()),
                    Value::Text("san marino".to_string()),
                ],
            )
            .unwrap();

        let once = generator.transform(&frame);
        let twice = generator.transform(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_input_not_mutated() {
        let generator = FeatureGenerator::new();
        let mut frame = FeatureFrame::new();
        frame
            .insert("Geography", vec![Value::Text("SPAIN".to_string())])
            .unwrap();
        frame.insert("Balance", vec![Value::Float(1.0)]).unwrap();
        let before = frame.clone();

        let _ = generator.transform(&frame);

        assert_eq!(frame, before);
    }
}
