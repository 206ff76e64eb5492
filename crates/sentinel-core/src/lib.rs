//! Core library for the latency sentinel
//!
//! This crate provides:
//! - A fixed-capacity sliding window of recent latency samples
//! - An isolation-forest detector retrained on every classification
//! - HTTP latency probing with an explicit penalty policy for failures
//! - The monitoring loop tying probe, window and detector together
//! - Health checks and observability

pub mod detector;
pub mod error;
pub mod health;
pub mod models;
pub mod monitor;
pub mod observability;
pub mod probe;
pub mod window;

pub use detector::{DetectorConfig, IsolationForestDetector, Verdict};
pub use error::DetectorError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use monitor::{MonitorConfig, MonitorLoop, MonitorLoopBuilder, OnlineDetector};
pub use observability::{SentinelMetrics, StructuredLogger};
pub use probe::{HttpProbe, LatencyProbe, PenaltyPolicy, ProbeError};
pub use window::SlidingWindow;
