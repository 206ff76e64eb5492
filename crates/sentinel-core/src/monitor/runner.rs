//! Latency monitoring loop
//!
//! Probes the target once per tick, feeds the sample to the online
//! detector and publishes a [`TickReport`] per tick on a channel.

use super::OnlineDetector;
use crate::detector::DetectorConfig;
use crate::models::TickReport;
use crate::probe::{LatencyProbe, PenaltyPolicy};
use anyhow::Result;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

/// Configuration for the monitoring loop
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Pause between ticks (default: 5 seconds)
    pub interval: Duration,
    /// Maximum random jitter added to each pause (default: none)
    pub jitter: Duration,
    /// Channel buffer size for tick reports
    pub buffer_size: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            jitter: Duration::ZERO,
            buffer_size: 64,
        }
    }
}

/// Periodically probes the target and classifies each sample
pub struct MonitorLoop {
    probe: Arc<dyn LatencyProbe>,
    online: OnlineDetector,
    penalty: PenaltyPolicy,
    config: MonitorConfig,
    reports_tx: mpsc::Sender<TickReport>,
    tick_count: u64,
}

impl MonitorLoop {
    /// Create a new monitoring loop and the receiving end of its reports
    pub fn new(
        probe: Arc<dyn LatencyProbe>,
        online: OnlineDetector,
        penalty: PenaltyPolicy,
        config: MonitorConfig,
    ) -> (Self, mpsc::Receiver<TickReport>) {
        let (reports_tx, reports_rx) = mpsc::channel(config.buffer_size.max(1));

        let monitor = Self {
            probe,
            online,
            penalty,
            config,
            reports_tx,
            tick_count: 0,
        };

        (monitor, reports_rx)
    }

    /// Run until shutdown is signalled or the report receiver is dropped
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            target_url = %self.probe.target(),
            interval_secs = self.config.interval.as_secs_f64(),
            window_capacity = self.online.window().capacity(),
            "Starting latency monitoring loop"
        );

        loop {
            let report = self.tick().await;

            if self.reports_tx.send(report).await.is_err() {
                warn!("Report receiver dropped, stopping monitoring loop");
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.next_delay()) => {}
                _ = shutdown.recv() => {
                    info!("Shutting down latency monitoring loop");
                    break;
                }
            }
        }
    }

    /// Probe once, push the sample and classify it
    pub async fn tick(&mut self) -> TickReport {
        let outcome = self.probe.probe().await;
        let latency_ms = self.penalty.sample(&outcome);
        self.tick_count += 1;

        let start = Instant::now();
        let verdict = match self.online.observe(latency_ms) {
            Ok(verdict) => verdict,
            Err(e) => {
                error!(error = %e, latency_ms = latency_ms, "Classification failed");
                None
            }
        };

        debug!(
            tick = self.tick_count,
            latency_ms = latency_ms,
            window_size = self.online.window().size(),
            classified = verdict.is_some(),
            "Tick complete"
        );

        TickReport {
            tick: self.tick_count,
            timestamp: chrono::Utc::now().timestamp_millis(),
            latency_ms,
            probe_error: outcome.err(),
            window_size: self.online.window().size(),
            verdict,
            classify_duration: verdict.map(|_| start.elapsed()),
        }
    }

    pub fn online(&self) -> &OnlineDetector {
        &self.online
    }

    /// Pause before the next tick, including jitter
    fn next_delay(&self) -> Duration {
        let jitter_ms = self.config.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.config.interval;
        }
        self.config.interval + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

/// Builder for creating the monitoring loop
pub struct MonitorLoopBuilder {
    probe: Option<Arc<dyn LatencyProbe>>,
    detector: DetectorConfig,
    penalty: PenaltyPolicy,
    config: MonitorConfig,
}

impl MonitorLoopBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            probe: None,
            detector: DetectorConfig::default(),
            penalty: PenaltyPolicy::default(),
            config: MonitorConfig::default(),
        }
    }

    /// Set the latency probe
    pub fn probe(mut self, probe: Arc<dyn LatencyProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Set the detector configuration
    pub fn detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Set the sample recorded for failed probes
    pub fn penalty(mut self, penalty: PenaltyPolicy) -> Self {
        self.penalty = penalty;
        self
    }

    /// Set the pause between ticks
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    /// Set the jitter duration
    pub fn jitter(mut self, jitter: Duration) -> Self {
        self.config.jitter = jitter;
        self
    }

    /// Set the report channel size
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    /// Build the monitoring loop
    pub fn build(self) -> Result<(MonitorLoop, mpsc::Receiver<TickReport>)> {
        let probe = self
            .probe
            .ok_or_else(|| anyhow::anyhow!("Probe is required"))?;
        let online = OnlineDetector::new(self.detector)?;

        Ok(MonitorLoop::new(probe, online, self.penalty, self.config))
    }
}

impl Default for MonitorLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
