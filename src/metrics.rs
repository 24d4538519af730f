//! Performance metrics and statistics tracking for the prediction service.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the request path
pub struct ServiceMetrics {
    /// Total prediction requests received
    pub requests_received: AtomicU64,
    /// Predictions served successfully
    pub predictions_served: AtomicU64,
    /// Requests rejected before or during inference
    pub requests_failed: AtomicU64,
    /// Served predictions by label
    predictions_by_label: RwLock<HashMap<String, u64>>,
    /// Request processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Churn probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ServiceMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests_received: AtomicU64::new(0),
            predictions_served: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            predictions_by_label: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record an incoming prediction request
    pub fn record_request(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a served prediction
    pub fn record_prediction(&self, processing_time: Duration, probability: f64, label: &str) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_label) = self.predictions_by_label.write() {
            *by_label.entry(label.to_string()).or_insert(0) += 1;
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (probability * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a failed request
    pub fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests_received.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get probability distribution
    pub fn get_probability_distribution(&self) -> [u64; 10] {
        *self.probability_buckets.read().unwrap()
    }

    /// Get served predictions by label
    pub fn get_predictions_by_label(&self) -> HashMap<String, u64> {
        self.predictions_by_label.read().unwrap().clone()
    }

    /// Seconds since the collector was created
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Serializable snapshot for the metrics endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_received: self.requests_received.load(Ordering::Relaxed),
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            predictions_by_label: self.get_predictions_by_label(),
            probability_distribution: self.get_probability_distribution(),
            processing: self.get_processing_stats(),
            throughput_per_sec: self.get_throughput(),
            uptime_secs: self.uptime_secs(),
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let requests = self.requests_received.load(Ordering::Relaxed);
        let served = self.predictions_served.load(Ordering::Relaxed);
        let failed = self.requests_failed.load(Ordering::Relaxed);
        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let by_label = self.get_predictions_by_label();

        info!(
            requests = requests,
            served = served,
            failed = failed,
            throughput = format!("{:.1} req/s", throughput),
            "Service metrics summary"
        );
        info!(
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            "Processing time (μs)"
        );
        for (label, count) in &by_label {
            let pct = if served > 0 {
                (*count as f64 / served as f64) * 100.0
            } else {
                0.0
            };
            info!(label = %label, count = count, pct = format!("{:.1}%", pct), "Predictions by label");
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default, Serialize)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Point-in-time view of the collected metrics
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub requests_received: u64,
    pub predictions_served: u64,
    pub requests_failed: u64,
    pub predictions_by_label: HashMap<String, u64>,
    pub probability_distribution: [u64; 10],
    pub processing: ProcessingStats,
    pub throughput_per_sec: f64,
    pub uptime_secs: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ServiceMetrics::new();

        metrics.record_request();
        metrics.record_request();
        metrics.record_prediction(Duration::from_micros(100), 0.87, "will churn");
        metrics.record_prediction(Duration::from_micros(200), 0.12, "will not churn");
        metrics.record_failure();

        assert_eq!(metrics.requests_received.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.predictions_served.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.requests_failed.load(Ordering::Relaxed), 1);

        let by_label = metrics.get_predictions_by_label();
        assert_eq!(by_label.get("will churn"), Some(&1));
        assert_eq!(by_label.get("will not churn"), Some(&1));
    }

    #[test]
    fn test_probability_buckets() {
        let metrics = ServiceMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), 0.05, "will not churn");
        metrics.record_prediction(Duration::from_micros(100), 0.95, "will churn");
        metrics.record_prediction(Duration::from_micros(100), 1.0, "will churn");

        let dist = metrics.get_probability_distribution();
        assert_eq!(dist[0], 1);
        assert_eq!(dist[9], 2); // 1.0 clamps into the last bucket
    }

    #[test]
    fn test_snapshot() {
        let metrics = ServiceMetrics::new();
        metrics.record_request();
        metrics.record_prediction(Duration::from_micros(150), 0.42, "will not churn");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_received, 1);
        assert_eq!(snapshot.predictions_served, 1);
        assert_eq!(snapshot.processing.count, 1);
    }
}
