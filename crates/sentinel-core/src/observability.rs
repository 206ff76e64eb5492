//! Observability infrastructure for the latency sentinel
//!
//! Provides:
//! - Prometheus metrics (probe latency, classification latency, window
//!   occupancy, anomaly score, verdict and failure counters)
//! - Structured JSON logging of every tick with tracing

use crate::models::TickReport;
use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, Encoder, Gauge, Histogram, IntCounter, IntCounterVec, IntGauge,
    TextEncoder,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for probe round trips (in seconds)
const PROBE_BUCKETS: &[f64] = &[
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0,
];

/// Histogram buckets for forest training and scoring (in seconds)
const CLASSIFY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<SentinelMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct SentinelMetricsInner {
    probe_latency_seconds: Histogram,
    classify_latency_seconds: Histogram,
    window_samples: IntGauge,
    anomaly_score: Gauge,
    anomaly_threshold: Gauge,
    classifications: IntCounter,
    anomalies_detected: IntCounter,
    probe_failures: IntCounterVec,
}

impl SentinelMetricsInner {
    fn new() -> Self {
        Self {
            probe_latency_seconds: register_histogram!(
                "latency_sentinel_probe_latency_seconds",
                "Round-trip time of successful probes",
                PROBE_BUCKETS.to_vec()
            )
            .expect("Failed to register probe_latency_seconds"),

            classify_latency_seconds: register_histogram!(
                "latency_sentinel_classify_latency_seconds",
                "Time spent training the forest and scoring a sample",
                CLASSIFY_BUCKETS.to_vec()
            )
            .expect("Failed to register classify_latency_seconds"),

            window_samples: register_int_gauge!(
                "latency_sentinel_window_samples",
                "Number of samples in the sliding window"
            )
            .expect("Failed to register window_samples"),

            anomaly_score: register_gauge!(
                "latency_sentinel_anomaly_score",
                "Isolation score of the most recent sample"
            )
            .expect("Failed to register anomaly_score"),

            anomaly_threshold: register_gauge!(
                "latency_sentinel_anomaly_threshold",
                "Score cutoff calibrated from the contamination target"
            )
            .expect("Failed to register anomaly_threshold"),

            classifications: register_int_counter!(
                "latency_sentinel_classifications_total",
                "Total number of classified samples"
            )
            .expect("Failed to register classifications"),

            anomalies_detected: register_int_counter!(
                "latency_sentinel_anomalies_detected_total",
                "Total number of samples classified as anomalous"
            )
            .expect("Failed to register anomalies_detected"),

            probe_failures: register_int_counter_vec!(
                "latency_sentinel_probe_failures_total",
                "Total number of failed probes by reason",
                &["reason"]
            )
            .expect("Failed to register probe_failures"),
        }
    }
}

/// Sentinel metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct SentinelMetrics {
    _private: (),
}

impl Default for SentinelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SentinelMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SentinelMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SentinelMetricsInner {
        GLOBAL_METRICS.get_or_init(SentinelMetricsInner::new)
    }

    /// Update all metrics from one tick
    pub fn record_tick(&self, report: &TickReport) {
        let inner = self.inner();
        inner.window_samples.set(report.window_size as i64);

        match &report.probe_error {
            Some(err) => inner
                .probe_failures
                .with_label_values(&[err.reason()])
                .inc(),
            None => inner.probe_latency_seconds.observe(report.latency_ms / 1000.0),
        }

        if let Some(verdict) = report.verdict {
            inner.classifications.inc();
            inner.anomaly_score.set(verdict.anomaly_score);
            inner.anomaly_threshold.set(verdict.threshold);
            if verdict.is_anomaly {
                inner.anomalies_detected.inc();
            }
        }

        if let Some(duration) = report.classify_duration {
            inner.classify_latency_seconds.observe(duration.as_secs_f64());
        }
    }

    /// Total anomalies flagged so far
    pub fn anomalies_detected(&self) -> u64 {
        self.inner().anomalies_detected.get()
    }

    /// Total classifications so far
    pub fn classifications(&self) -> u64 {
        self.inner().classifications.get()
    }

    /// Encode every registered metric in the Prometheus text format
    pub fn encode_text(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
        Ok(buffer)
    }
}

/// Structured logger for sentinel events
///
/// Provides consistent JSON-formatted logging for verdicts, probe
/// failures and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    node_name: String,
    target_url: String,
}

impl StructuredLogger {
    pub fn new(node_name: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            target_url: target_url.into(),
        }
    }

    /// Log everything noteworthy about one tick
    pub fn log_tick(&self, report: &TickReport, min_points: usize) {
        if let Some(err) = &report.probe_error {
            warn!(
                event = "probe_failed",
                node = %self.node_name,
                target_url = %self.target_url,
                reason = err.reason(),
                error = %err,
                penalty_ms = report.latency_ms,
                "Probe failed, recording penalty sample"
            );
        }

        match report.verdict {
            Some(verdict) if verdict.is_anomaly => {
                warn!(
                    event = "latency_anomaly",
                    node = %self.node_name,
                    target_url = %self.target_url,
                    tick = report.tick,
                    latency_ms = report.latency_ms,
                    anomaly_score = verdict.anomaly_score,
                    threshold = verdict.threshold,
                    "Anomaly detected: high latency"
                );
            }
            Some(verdict) => {
                info!(
                    event = "latency_normal",
                    node = %self.node_name,
                    target_url = %self.target_url,
                    tick = report.tick,
                    latency_ms = report.latency_ms,
                    anomaly_score = verdict.anomaly_score,
                    threshold = verdict.threshold,
                    "System stable"
                );
            }
            None => {
                info!(
                    event = "warming_up",
                    node = %self.node_name,
                    tick = report.tick,
                    latency_ms = report.latency_ms,
                    window_size = report.window_size,
                    min_points = min_points,
                    "Collecting history before classification"
                );
            }
        }
    }

    /// Log sentinel startup
    pub fn log_startup(&self, version: &str, window_capacity: usize, contamination: f64) {
        info!(
            event = "sentinel_started",
            node = %self.node_name,
            target_url = %self.target_url,
            version = %version,
            window_capacity = window_capacity,
            contamination = contamination,
            "Latency sentinel started"
        );
    }

    /// Log sentinel shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "sentinel_shutdown",
            node = %self.node_name,
            reason = %reason,
            "Latency sentinel shutting down"
        );
    }
}
