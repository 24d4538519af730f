//! Prediction outcome types

use serde::{Deserialize, Serialize};

/// Predicted churn class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnLabel {
    WillChurn,
    WillNotChurn,
}

impl ChurnLabel {
    /// Label from the model's predicted class (1 = churn)
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            ChurnLabel::WillChurn
        } else {
            ChurnLabel::WillNotChurn
        }
    }

    /// Response label text
    pub fn as_str(&self) -> &'static str {
        match self {
            ChurnLabel::WillChurn => "will churn",
            ChurnLabel::WillNotChurn => "will not churn",
        }
    }
}

/// Result of running one record through the inference pipeline
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Predicted class label
    pub label: ChurnLabel,
    /// Model probability of the churn class, unrounded
    pub probability: f64,
}

impl Prediction {
    /// Build the wire response: label text plus the probability rounded
    /// to 2 decimal places.
    pub fn to_response(&self) -> PredictionResponse {
        PredictionResponse {
            forecast: self.label.as_str().to_string(),
            probability: round2(self.probability),
        }
    }
}

/// JSON body returned by `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub forecast: String,
    pub probability: f64,
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_class() {
        assert_eq!(ChurnLabel::from_class(1), ChurnLabel::WillChurn);
        assert_eq!(ChurnLabel::from_class(0), ChurnLabel::WillNotChurn);
        assert_eq!(ChurnLabel::WillChurn.as_str(), "will churn");
        assert_eq!(ChurnLabel::WillNotChurn.as_str(), "will not churn");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round2(0.876543), 0.88);
        assert_eq!(round2(0.874999), 0.87);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(1.0), 1.0);
    }

    #[test]
    fn test_response_serialization() {
        let prediction = Prediction {
            label: ChurnLabel::WillChurn,
            probability: 0.87312,
        };

        let json = serde_json::to_value(prediction.to_response()).unwrap();
        assert_eq!(json["forecast"], "will churn");
        assert_eq!(json["probability"], 0.87);
    }
}
