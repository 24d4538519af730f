//! HTTP surface of the prediction service

use crate::error::ApiError;
use crate::metrics::ServiceMetrics;
use crate::models::ChurnPipeline;
use crate::types::CustomerRecord;
use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Shared per-process state handed to every request handler.
///
/// The pipeline is `None` when the model artifact failed to load at
/// startup; the service still runs and reports the degraded state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Option<Arc<ChurnPipeline>>,
    pub metrics: Arc<ServiceMetrics>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: Option<Arc<ChurnPipeline>>, metrics: Arc<ServiceMetrics>) -> Self {
        Self {
            pipeline,
            metrics,
            started_at: Utc::now(),
        }
    }
}

/// Register all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/docs", web::get().to(docs))
        .route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics_snapshot))
        .route("/predict", web::post().to(predict));
}

/// Map JSON extraction failures onto the validation error shape.
///
/// serde already names the offending field ("missing field `age`"),
/// so the extractor message is surfaced as the detail text.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}

/// `POST /predict` - run one customer record through the model pipeline
async fn predict(
    state: web::Data<AppState>,
    record: web::Json<CustomerRecord>,
) -> Result<HttpResponse, ApiError> {
    let start_time = Instant::now();
    state.metrics.record_request();

    let pipeline = state.pipeline.as_ref().ok_or_else(|| {
        state.metrics.record_failure();
        ApiError::ModelUnavailable
    })?;

    let frame = record.to_frame();
    let prediction = pipeline.predict(&frame).map_err(|e| {
        state.metrics.record_failure();
        warn!(error = format!("{e:#}"), "Prediction rejected");
        ApiError::Rejected(format!("{e:#}"))
    })?;

    state.metrics.record_prediction(
        start_time.elapsed(),
        prediction.probability,
        prediction.label.as_str(),
    );

    info!(
        forecast = prediction.label.as_str(),
        probability = prediction.probability,
        processing_time_us = start_time.elapsed().as_micros(),
        "Prediction served"
    );

    Ok(HttpResponse::Ok().json(prediction.to_response()))
}

/// `GET /` - convenience redirect to the service documentation
async fn index() -> web::Redirect {
    web::Redirect::to("/docs")
}

/// `GET /docs` - short machine-readable service description
async fn docs() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "name": "Churn Insight API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /predict": "run a customer record through the churn model",
            "GET /health": "service and model readiness",
            "GET /metrics": "request metrics snapshot"
        }
    }))
}

/// `GET /health` - readiness probe; reports degraded when the model is
/// not loaded
async fn health(state: web::Data<AppState>) -> HttpResponse {
    let model_loaded = state.pipeline.is_some();
    let status = if model_loaded { "ok" } else { "degraded" };

    HttpResponse::Ok().json(json!({
        "status": status,
        "model_loaded": model_loaded,
        "started_at": state.started_at,
        "uptime_secs": state.metrics.uptime_secs(),
    }))
}

/// `GET /metrics` - point-in-time metrics snapshot
async fn metrics_snapshot(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.metrics.snapshot())
}
