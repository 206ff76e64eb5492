//! Latency Sentinel - online latency anomaly detection agent
//!
//! This binary runs as a sidecar next to the monitored service, probing
//! its endpoint on a fixed interval and classifying every sample against
//! a sliding window of recent history.

use anyhow::Result;
use sentinel_core::{
    health::{components, HealthRegistry},
    observability::{SentinelMetrics, StructuredLogger},
    HttpProbe, MonitorLoopBuilder, PenaltyPolicy,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SENTINEL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting latency-sentinel");

    // Load configuration
    let config = config::SentinelConfig::load()?;
    let detector_config = config.detector();
    let min_points = detector_config.min_points;
    info!(
        node_name = %config.node_name,
        target_url = %config.target_url,
        "Sentinel configured"
    );

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::PROBE).await;
    health_registry
        .set_degraded(
            components::DETECTOR,
            format!("warming up: 0/{} samples", min_points),
        )
        .await;

    let metrics = SentinelMetrics::new();

    let logger = StructuredLogger::new(&config.node_name, &config.target_url);
    logger.log_startup(
        SENTINEL_VERSION,
        detector_config.window_capacity,
        detector_config.contamination,
    );

    // Build the monitoring loop
    let probe = HttpProbe::new(&config.target_url, config.probe_timeout())?;
    let (monitor, mut reports) = MonitorLoopBuilder::new()
        .probe(Arc::new(probe))
        .detector(detector_config)
        .penalty(PenaltyPolicy::new(config.timeout_penalty_ms))
        .interval(config.poll_interval())
        .build()?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let monitor_handle = tokio::spawn(monitor.run(shutdown_tx.subscribe()));

    // Consume tick reports: log, export metrics, update health
    let reporter_handle = tokio::spawn({
        let logger = logger.clone();
        let metrics = metrics.clone();
        let health_registry = health_registry.clone();
        async move {
            while let Some(report) = reports.recv().await {
                logger.log_tick(&report, min_points);
                metrics.record_tick(&report);
                health_registry.record_tick(&report, min_points).await;
            }
            health_registry
                .set_unhealthy(components::PROBE, "Monitoring loop exited")
                .await;
        }
    });

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(health_registry.clone(), metrics));
    health_registry.set_ready(true).await;

    // Start health and metrics server
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Wait for shutdown signal or an API server failure
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            logger.log_shutdown("SIGINT received");
        }
        result = api_handle => {
            match result {
                Ok(Ok(())) => logger.log_shutdown("API server stopped"),
                Ok(Err(e)) => error!(error = %e, "API server failed"),
                Err(e) => error!(error = %e, "API server task panicked"),
            }
        }
    }

    let _ = shutdown_tx.send(());
    monitor_handle.await?;
    reporter_handle.await?;
    info!("Shutting down");

    Ok(())
}
