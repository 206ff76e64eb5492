//! Continuous latency monitoring
//!
//! [`OnlineDetector`] couples the sliding window with the detector: each
//! observation is pushed first and then classified against the window
//! once enough history exists. [`MonitorLoop`] drives it from a probe on
//! a fixed interval.

mod runner;

pub use runner::{MonitorConfig, MonitorLoop, MonitorLoopBuilder};

use crate::detector::{is_valid_sample, DetectorConfig, IsolationForestDetector, Verdict};
use crate::error::DetectorError;
use crate::window::SlidingWindow;

/// Sliding window plus detector, fed one sample at a time
#[derive(Debug, Clone)]
pub struct OnlineDetector {
    window: SlidingWindow,
    detector: IsolationForestDetector,
}

impl OnlineDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, DetectorError> {
        let window = SlidingWindow::new(config.window_capacity)?;
        let detector = IsolationForestDetector::new(config)?;
        Ok(Self { window, detector })
    }

    /// Push `latency_ms` and classify it, or `None` while warming up
    pub fn observe(&mut self, latency_ms: f64) -> Result<Option<Verdict>, DetectorError> {
        // Keep invalid values out of the window entirely
        if !is_valid_sample(latency_ms) {
            return Err(DetectorError::InvalidSample { value: latency_ms });
        }
        self.window.push(latency_ms);

        if !self.detector.is_ready(self.window.size()) {
            return Ok(None);
        }

        self.detector
            .classify(&self.window.contents(), latency_ms)
            .map(Some)
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn detector(&self) -> &IsolationForestDetector {
        &self.detector
    }

    /// Samples still needed before the first classification
    pub fn samples_until_ready(&self) -> usize {
        self.detector
            .config()
            .min_points
            .saturating_sub(self.window.size())
    }
}
