//! Churn Insight Service - Main Entry Point
//!
//! Loads the churn model artifact, then serves predictions over HTTP.
//! A failed model load does not abort startup: the service runs in
//! degraded mode so readiness probes can observe the state.

use actix_web::{web, App, HttpServer};
use anyhow::Result;
use churn_insight::{
    config::AppConfig,
    metrics::{MetricsReporter, ServiceMetrics},
    models::ChurnPipeline,
    routes::{self, AppState},
};
use std::sync::Arc;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    if config.logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting Churn Insight Service");
    info!(
        model_path = %config.model.path,
        threshold = config.model.threshold,
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics = Arc::new(ServiceMetrics::new());

    // Load the inference pipeline; keep serving when the artifact is
    // missing or unreadable
    let pipeline = match ChurnPipeline::load(&config.model) {
        Ok(pipeline) => Some(Arc::new(pipeline)),
        Err(e) => {
            error!(
                error = format!("{e:#}"),
                "Failed to load model, serving in degraded mode"
            );
            None
        }
    };

    let state = AppState::new(pipeline, metrics.clone());

    // Start metrics reporter (prints summary every 60 seconds)
    let metrics_clone = metrics.clone();
    actix_web::rt::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 60);
        reporter.start().await;
    });

    let bind_addr = (config.server.host.clone(), config.server.port);
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Listening for prediction requests"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::json_error_handler))
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    info!("Service shutting down...");
    metrics.print_summary();

    Ok(())
}
