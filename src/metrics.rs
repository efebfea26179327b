//! Request metrics and statistics tracking for the prediction service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// How a request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Success,
    /// Rejected before reaching the model (HTTP 400)
    Rejected,
    /// Fault while predicting, whatever status it was reported with
    Failed,
}

/// Metrics collector for the `/predict` route
pub struct ServiceMetrics {
    /// Total requests handled
    pub requests: AtomicU64,
    /// Requests rejected for missing input
    pub rejected: AtomicU64,
    /// Requests that faulted
    pub failed: AtomicU64,
    /// Request latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Iris predictions by label
    labels: RwLock<HashMap<String, u64>>,
    /// Sum and count of housing predictions
    regression: RwLock<(f64, u64)>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ServiceMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            labels: RwLock::new(HashMap::new()),
            regression: RwLock::new((0.0, 0)),
            start_time: Instant::now(),
        }
    }

    /// Record a handled request
    pub fn record_request(&self, latency: Duration, outcome: RequestOutcome) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        match outcome {
            RequestOutcome::Success => {}
            RequestOutcome::Rejected => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
            }
            RequestOutcome::Failed => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        if let Ok(mut latencies) = self.latencies.write() {
            latencies.push(latency.as_micros() as u64);
            // Keep only the most recent samples
            if latencies.len() > 10000 {
                latencies.drain(0..5000);
            }
        }
    }

    /// Record an iris label
    pub fn record_label(&self, label: &str) {
        if let Ok(mut labels) = self.labels.write() {
            *labels.entry(label.to_string()).or_insert(0) += 1;
        }
    }

    /// Record a housing prediction
    pub fn record_value(&self, value: f64) {
        if let Ok(mut regression) = self.regression.write() {
            regression.0 += value;
            regression.1 += 1;
        }
    }

    /// Get latency statistics
    pub fn get_latency_stats(&self) -> LatencyStats {
        let mut sorted: Vec<u64> = match self.latencies.read() {
            Ok(latencies) if !latencies.is_empty() => latencies.clone(),
            _ => return LatencyStats::default(),
        };
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();
        let at = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: at(0.5),
            p95_us: at(0.95),
            p99_us: at(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Get predictions by label
    pub fn get_label_counts(&self) -> HashMap<String, u64> {
        self.labels.read().map(|l| l.clone()).unwrap_or_default()
    }

    /// Mean of all recorded housing predictions
    pub fn get_mean_value(&self) -> Option<f64> {
        let regression = self.regression.read().ok()?;
        (regression.1 > 0).then(|| regression.0 / regression.1 as f64)
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let requests = self.requests.load(Ordering::Relaxed);
        let rejected = self.rejected.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let latency = self.get_latency_stats();

        info!(
            requests,
            rejected,
            failed,
            throughput = format!("{:.2} req/s", self.get_throughput()),
            mean_us = latency.mean_us,
            p50_us = latency.p50_us,
            p95_us = latency.p95_us,
            p99_us = latency.p99_us,
            max_us = latency.max_us,
            "Prediction service summary"
        );

        let labels = self.get_label_counts();
        let total: u64 = labels.values().sum();
        for (label, count) in &labels {
            let pct = if total > 0 {
                (*count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            info!(label = %label, count, share = format!("{:.1}%", pct), "Predictions by label");
        }

        if let Some(mean) = self.get_mean_value() {
            info!(mean_prediction = mean, "Housing predictions");
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Request latency statistics
#[derive(Debug, Default)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
