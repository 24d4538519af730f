//! Customer record schema for churn prediction requests

use crate::types::frame::{FeatureFrame, Value};
use serde::{Deserialize, Serialize};

/// External request field names (camelCase) paired with the column names
/// the model was trained on (PascalCase).
///
/// This table is the single source of truth for the request-to-feature
/// mapping; `CustomerRecord::to_frame` is driven by it so schema drift
/// shows up in one place.
pub const COLUMN_MAP: [(&str, &str); 12] = [
    ("creditScore", "CreditScore"),
    ("geography", "Geography"),
    ("gender", "Gender"),
    ("age", "Age"),
    ("tenure", "Tenure"),
    ("balance", "Balance"),
    ("numOfProducts", "NumOfProducts"),
    ("hasCrCard", "HasCrCard"),
    ("isActiveMember", "IsActiveMember"),
    ("estimatedSalary", "EstimatedSalary"),
    ("satisfactionScore", "SatisfactionScore"),
    ("complain", "Complain"),
];

/// A customer profile submitted for churn prediction.
///
/// All fields are required; a missing or mistyped field fails JSON
/// extraction before any inference work happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    /// Country of residence
    pub geography: String,

    /// Customer gender
    pub gender: String,

    /// Age in years
    pub age: i64,

    /// Credit bureau score
    pub credit_score: i64,

    /// Current account balance
    pub balance: f64,

    /// Estimated yearly salary
    pub estimated_salary: f64,

    /// Years as a customer
    pub tenure: i64,

    /// Number of bank products held
    pub num_of_products: i64,

    /// Satisfaction survey score
    pub satisfaction_score: i64,

    /// Whether the customer is an active member
    pub is_active_member: bool,

    /// Whether the customer holds a credit card
    pub has_cr_card: bool,

    /// Whether the customer has filed a complaint
    pub complain: bool,
}

impl CustomerRecord {
    /// Build the single-row feature frame the model pipeline consumes.
    ///
    /// Columns are named per `COLUMN_MAP` and booleans are coerced to 0/1
    /// integers, matching the training data format.
    pub fn to_frame(&self) -> FeatureFrame {
        let mut frame = FeatureFrame::new();
        for (request_field, column) in COLUMN_MAP {
            // Single-row inserts into a fresh frame cannot mismatch
            let _ = frame.insert(column, vec![self.field_value(request_field)]);
        }
        frame
    }

    fn field_value(&self, request_field: &str) -> Value {
        match request_field {
            "creditScore" => Value::Int(self.credit_score),
            "geography" => Value::Text(self.geography.clone()),
            "gender" => Value::Text(self.gender.clone()),
            "age" => Value::Int(self.age),
            "tenure" => Value::Int(self.tenure),
            "balance" => Value::Float(self.balance),
            "numOfProducts" => Value::Int(self.num_of_products),
            "hasCrCard" => Value::Int(self.has_cr_card as i64),
            "isActiveMember" => Value::Int(self.is_active_member as i64),
            "estimatedSalary" => Value::Float(self.estimated_salary),
            "satisfactionScore" => Value::Int(self.satisfaction_score),
            "complain" => Value::Int(self.complain as i64),
            other => unreachable!("field {other} missing from COLUMN_MAP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> CustomerRecord {
        CustomerRecord {
            geography: "france".to_string(),
            gender: "Male".to_string(),
            age: 40,
            credit_score: 650,
            balance: 0.0,
            estimated_salary: 50000.0,
            tenure: 3,
            num_of_products: 2,
            satisfaction_score: 3,
            is_active_member: true,
            has_cr_card: true,
            complain: false,
        }
    }

    #[test]
    fn test_camel_case_deserialization() {
        let json = r#"{
            "geography": "Germany",
            "gender": "Female",
            "age": 52,
            "creditScore": 710,
            "balance": 120430.5,
            "estimatedSalary": 88000.0,
            "tenure": 8,
            "numOfProducts": 1,
            "satisfactionScore": 4,
            "isActiveMember": false,
            "hasCrCard": true,
            "complain": true
        }"#;

        let record: CustomerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.geography, "Germany");
        assert_eq!(record.credit_score, 710);
        assert_eq!(record.num_of_products, 1);
        assert!(!record.is_active_member);
    }

    #[test]
    fn test_missing_field_rejected() {
        // No "age" field
        let json = r#"{
            "geography": "Germany",
            "gender": "Female",
            "creditScore": 710,
            "balance": 120430.5,
            "estimatedSalary": 88000.0,
            "tenure": 8,
            "numOfProducts": 1,
            "satisfactionScore": 4,
            "isActiveMember": false,
            "hasCrCard": true,
            "complain": true
        }"#;

        let err = serde_json::from_str::<CustomerRecord>(json).unwrap_err();
        assert!(err.to_string().contains("age"));
    }

    #[test]
    fn test_to_frame_column_names() {
        let frame = sample_record().to_frame();

        let expected: Vec<&str> = COLUMN_MAP.iter().map(|(_, col)| *col).collect();
        assert_eq!(frame.column_names(), expected);
        assert_eq!(frame.num_rows(), 1);
    }

    #[test]
    fn test_boolean_coercion() {
        let frame = sample_record().to_frame();

        assert_eq!(frame.column("IsActiveMember").unwrap(), &[Value::Int(1)]);
        assert_eq!(frame.column("HasCrCard").unwrap(), &[Value::Int(1)]);
        assert_eq!(frame.column("Complain").unwrap(), &[Value::Int(0)]);
    }

    #[test]
    fn test_to_frame_values() {
        let frame = sample_record().to_frame();

        assert_eq!(
            frame.column("Geography").unwrap(),
            &[Value::Text("france".to_string())]
        );
        assert_eq!(frame.column("Balance").unwrap(), &[Value::Float(0.0)]);
        assert_eq!(frame.column("CreditScore").unwrap(), &[Value::Int(650)]);
    }
}
