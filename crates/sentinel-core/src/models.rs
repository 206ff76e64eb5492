//! Core data models for the latency sentinel

use crate::detector::Verdict;
use crate::probe::ProbeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one monitoring tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Sequence number, starting at 1
    pub tick: u64,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Sample pushed into the window (penalty value on probe failure)
    pub latency_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_error: Option<ProbeError>,
    /// Window occupancy after the push
    pub window_size: usize,
    /// `None` while the window is warming up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    /// Time spent training and scoring, when a verdict was produced
    #[serde(skip)]
    pub classify_duration: Option<Duration>,
}

impl TickReport {
    pub fn is_anomaly(&self) -> bool {
        self.verdict.map(|v| v.is_anomaly).unwrap_or(false)
    }

    pub fn is_warming_up(&self) -> bool {
        self.verdict.is_none()
    }
}
