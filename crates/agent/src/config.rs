//! Sentinel configuration

use anyhow::{Context, Result};
use sentinel_core::probe::{DEFAULT_PROBE_TIMEOUT, DEFAULT_TIMEOUT_PENALTY_MS};
use sentinel_core::DetectorConfig;
use serde::Deserialize;
use std::time::Duration;

/// Sentinel configuration, read from `SENTINEL_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct SentinelConfig {
    /// Node name from Kubernetes downward API
    #[serde(default = "default_node_name")]
    pub node_name: String,

    /// API server port for health/metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Endpoint whose latency is monitored
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Per-probe request timeout in milliseconds
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Pause between probes in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Sample recorded when a probe fails
    #[serde(default = "default_timeout_penalty_ms")]
    pub timeout_penalty_ms: f64,

    /// Samples kept in the sliding window
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,

    /// History required before classifying
    #[serde(default = "default_min_points")]
    pub min_points: usize,

    /// Trees per forest
    #[serde(default = "default_ensemble_size")]
    pub ensemble_size: usize,

    /// Expected fraction of anomalies
    #[serde(default = "default_contamination")]
    pub contamination: f64,

    /// Seed for tree construction
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
}

fn default_node_name() -> String {
    std::env::var("NODE_NAME").unwrap_or_else(|_| "unknown".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_target_url() -> String {
    "http://backend-service:80".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT.as_millis() as u64
}

fn default_poll_interval() -> u64 {
    5
}

fn default_timeout_penalty_ms() -> f64 {
    DEFAULT_TIMEOUT_PENALTY_MS
}

fn default_window_capacity() -> usize {
    DetectorConfig::default().window_capacity
}

fn default_min_points() -> usize {
    DetectorConfig::default().min_points
}

fn default_ensemble_size() -> usize {
    DetectorConfig::default().ensemble_size
}

fn default_contamination() -> f64 {
    DetectorConfig::default().contamination
}

fn default_random_seed() -> u64 {
    DetectorConfig::default().random_seed
}

impl SentinelConfig {
    /// Load configuration from the environment and validate detector options
    pub fn load() -> Result<Self> {
        let source = config::Config::builder()
            .add_source(config::Environment::with_prefix("SENTINEL").try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        Self::from_config(source)
    }

    fn from_config(source: config::Config) -> Result<Self> {
        let config: SentinelConfig = source
            .try_deserialize()
            .context("Failed to parse configuration")?;
        config.detector().validate()?;
        anyhow::ensure!(
            config.timeout_penalty_ms.is_finite() && config.timeout_penalty_ms >= 0.0,
            "timeout_penalty_ms must be a non-negative number, got {}",
            config.timeout_penalty_ms
        );
        Ok(config)
    }

    /// Window and detector options
    pub fn detector(&self) -> DetectorConfig {
        DetectorConfig {
            window_capacity: self.window_capacity,
            min_points: self.min_points,
            ensemble_size: self.ensemble_size,
            contamination: self.contamination,
            random_seed: self.random_seed,
            ..Default::default()
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_from(pairs: &[(&str, &str)]) -> Result<SentinelConfig> {
        let mut builder = config::Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value)?;
        }
        SentinelConfig::from_config(builder.build()?)
    }

    #[test]
    fn test_defaults() {
        let config = load_from(&[]).unwrap();

        assert_eq!(config.api_port, 8080);
        assert_eq!(config.target_url, "http://backend-service:80");
        assert_eq!(config.probe_timeout(), Duration::from_secs(2));
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.timeout_penalty_ms, 2000.0);
        assert_eq!(config.detector(), DetectorConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = load_from(&[
            ("target_url", "http://localhost:9000/health"),
            ("contamination", "0.05"),
            ("window_capacity", "100"),
        ])
        .unwrap();

        assert_eq!(config.target_url, "http://localhost:9000/health");
        assert_eq!(config.detector().contamination, 0.05);
        assert_eq!(config.detector().window_capacity, 100);
        assert_eq!(config.detector().min_points, 20);
    }

    #[test]
    fn test_invalid_detector_options_rejected() {
        assert!(load_from(&[("contamination", "1.5")]).is_err());
        assert!(load_from(&[("window_capacity", "10")]).is_err());
    }

    #[test]
    fn test_invalid_timeout_penalty_rejected() {
        assert!(load_from(&[("timeout_penalty_ms", "-5")]).is_err());
        assert!(load_from(&[("timeout_penalty_ms", "NaN")]).is_err());
        assert!(load_from(&[("timeout_penalty_ms", "0")]).is_ok());
    }
}
