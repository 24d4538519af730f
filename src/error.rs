//! Error taxonomy for the request path and the inference pipeline

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Failures inside the inference pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing required column {0}")]
    MissingColumn(String),

    #[error("unknown {column} category: {value}")]
    UnknownCategory { column: String, value: String },

    #[error("column {column} value {value} is not numeric")]
    NonNumericValue { column: String, value: String },

    #[error("column {column} has {got} rows, frame has {expected}")]
    RowCountMismatch {
        column: String,
        got: usize,
        expected: usize,
    },
}

/// Client-facing request failures.
///
/// Every failure on the request path is mapped here at the boundary and
/// rendered as a `{"detail": ...}` body; nothing propagates as an
/// unhandled crash. None of these are retried internally.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed, missing, or mistyped request fields
    #[error("{0}")]
    Validation(String),

    /// Schema-valid request the model pipeline cannot process
    #[error("{0}")]
    Rejected(String),

    /// Model artifact was not loaded at startup
    #[error("model is not loaded")]
    ModelUnavailable,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::ModelUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("missing field `age`".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Rejected("unknown Geography category: Mars".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ModelUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_pipeline_error_messages() {
        let err = PipelineError::UnknownCategory {
            column: "Geography".to_string(),
            value: "Atlantis".to_string(),
        };
        assert_eq!(err.to_string(), "unknown Geography category: Atlantis");

        let err = PipelineError::MissingColumn("HasBalance".to_string());
        assert_eq!(err.to_string(), "missing required column HasBalance");
    }
}
