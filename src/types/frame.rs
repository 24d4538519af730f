//! Named-column tabular records passed through the inference pipeline

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// A single cell in a tabular record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the value. `Text` is parsed when possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// String view of the value. Numbers render in their canonical form.
    pub fn to_text(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

/// A tabular record with named columns and a uniform row count.
///
/// Columns are looked up strictly by name; the model schema must never
/// depend on column position. Replacing an existing column keeps its slot
/// so repeated transformation passes produce identical frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<(String, Vec<Value>)>,
}

impl FeatureFrame {
    /// Create an empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows (0 for an empty frame)
    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|(_, v)| v.len()).unwrap_or(0)
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether a column with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Column values by name
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Insert a column, or replace an existing one in place.
    ///
    /// The values must match the frame's row count unless the frame is empty.
    pub fn insert(&mut self, name: &str, values: Vec<Value>) -> Result<(), PipelineError> {
        if !self.columns.is_empty() && values.len() != self.num_rows() {
            return Err(PipelineError::RowCountMismatch {
                column: name.to_string(),
                got: values.len(),
                expected: self.num_rows(),
            });
        }

        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name.to_string(), values)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_not_position() {
        let mut frame = FeatureFrame::new();
        frame.insert("B", vec![Value::Int(2)]).unwrap();
        frame.insert("A", vec![Value::Int(1)]).unwrap();

        assert_eq!(frame.column("A"), Some(&[Value::Int(1)][..]));
        assert_eq!(frame.column("B"), Some(&[Value::Int(2)][..]));
        assert!(frame.column("C").is_none());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut frame = FeatureFrame::new();
        frame.insert("A", vec![Value::Int(1)]).unwrap();
        frame.insert("B", vec![Value::Int(2)]).unwrap();
        frame.insert("A", vec![Value::Int(9)]).unwrap();

        assert_eq!(frame.column_names(), vec!["A", "B"]);
        assert_eq!(frame.column("A"), Some(&[Value::Int(9)][..]));
        assert_eq!(frame.num_columns(), 2);
    }

    #[test]
    fn test_row_count_guard() {
        let mut frame = FeatureFrame::new();
        frame
            .insert("A", vec![Value::Int(1), Value::Int(2)])
            .unwrap();

        let err = frame.insert("B", vec![Value::Int(3)]).unwrap_err();
        assert!(matches!(err, PipelineError::RowCountMismatch { .. }));
        assert_eq!(frame.num_columns(), 1);
    }

    #[test]
    fn test_value_views() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Text("2.5".to_string()).as_f64(), Some(2.5));
        assert_eq!(Value::Text("France".to_string()).as_f64(), None);
        assert_eq!(Value::Int(42).to_text(), "42");
        assert_eq!(Value::Text("Spain".to_string()).to_text(), "Spain");
    }
}
