//! Latency probing of the monitored endpoint
//!
//! A probe issues one request per tick and reports the elapsed time. Failed
//! probes are typed; [`PenaltyPolicy`] turns them into an extreme but
//! ordinary sample so the detector sees outages as latency spikes.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Default request timeout for a probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default sample substituted for a failed probe, in milliseconds
pub const DEFAULT_TIMEOUT_PENALTY_MS: f64 = 2000.0;

/// Why a probe produced no latency measurement
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum ProbeError {
    #[error("probe timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid probe target: {0}")]
    InvalidTarget(String),
}

impl ProbeError {
    /// Short label used for metrics and logs
    pub fn reason(&self) -> &'static str {
        match self {
            ProbeError::Timeout { .. } => "timeout",
            ProbeError::Connection(_) => "connection",
            ProbeError::InvalidTarget(_) => "invalid_target",
        }
    }
}

/// Source of latency measurements
#[async_trait]
pub trait LatencyProbe: Send + Sync {
    /// Measure one round trip to the target
    async fn probe(&self) -> Result<Duration, ProbeError>;

    /// Human-readable target description
    fn target(&self) -> &str;
}

/// HTTP GET probe against a fixed URL
pub struct HttpProbe {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl HttpProbe {
    /// Create a probe for `target` with a per-request `timeout`
    pub fn new(target: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let url = Url::parse(target).map_err(|e| ProbeError::InvalidTarget(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProbeError::InvalidTarget(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::InvalidTarget(e.to_string()))?;

        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    fn map_error(&self, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ProbeError::Connection(err.to_string())
        }
    }
}

#[async_trait]
impl LatencyProbe for HttpProbe {
    async fn probe(&self) -> Result<Duration, ProbeError> {
        let start = Instant::now();

        // Any HTTP status counts; only transport failures are errors
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| self.map_error(e))?;
        let status = response.status();
        response.bytes().await.map_err(|e| self.map_error(e))?;

        let elapsed = start.elapsed();
        debug!(
            target_url = %self.url,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Probe completed"
        );

        Ok(elapsed)
    }

    fn target(&self) -> &str {
        self.url.as_str()
    }
}

/// Converts probe outcomes into detector samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyPolicy {
    /// Sample recorded when a probe fails
    pub timeout_penalty_ms: f64,
}

impl PenaltyPolicy {
    pub fn new(timeout_penalty_ms: f64) -> Self {
        Self { timeout_penalty_ms }
    }

    /// Latency in milliseconds, or the penalty for a failed probe
    pub fn sample(&self, outcome: &Result<Duration, ProbeError>) -> f64 {
        match outcome {
            Ok(elapsed) => elapsed.as_secs_f64() * 1000.0,
            Err(_) => self.timeout_penalty_ms,
        }
    }
}

impl Default for PenaltyPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_PENALTY_MS)
    }
}
