//! Offline replay of a latency trace through the detector

use anyhow::Result;
use colored::Colorize;
use sentinel_core::{DetectorConfig, OnlineDetector, Verdict};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use super::trace::read_trace;
use crate::output::{color_verdict, format_latency, format_score, print_info, print_table, OutputFormat};

/// One replayed tick
#[derive(Debug, Clone, Serialize)]
pub struct ReplayRecord {
    pub tick: usize,
    pub latency_ms: f64,
    pub window_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
}

/// Row for the replay table
#[derive(Tabled, Serialize)]
struct ReplayRow {
    #[tabled(rename = "Tick")]
    tick: usize,
    #[tabled(rename = "Latency")]
    latency: String,
    #[tabled(rename = "Window")]
    window: usize,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Threshold")]
    threshold: String,
    #[tabled(rename = "Verdict")]
    verdict: String,
}

impl From<&ReplayRecord> for ReplayRow {
    fn from(record: &ReplayRecord) -> Self {
        let (score, threshold) = match record.verdict {
            Some(v) => (format_score(v.anomaly_score), format_score(v.threshold)),
            None => ("-".to_string(), "-".to_string()),
        };
        Self {
            tick: record.tick,
            latency: format_latency(record.latency_ms),
            window: record.window_size,
            score,
            threshold,
            verdict: color_verdict(record.verdict.as_ref()),
        }
    }
}

/// Feed `samples` through a fresh window and detector, one tick each
pub fn replay(samples: &[f64], config: DetectorConfig) -> Result<Vec<ReplayRecord>> {
    let mut online = OnlineDetector::new(config)?;

    samples
        .iter()
        .enumerate()
        .map(|(i, &latency_ms)| {
            let verdict = online.observe(latency_ms)?;
            Ok(ReplayRecord {
                tick: i + 1,
                latency_ms,
                window_size: online.window().size(),
                verdict,
            })
        })
        .collect()
}

/// Replay a trace file and print the result
pub fn replay_file(
    path: &Path,
    config: DetectorConfig,
    anomalies_only: bool,
    format: OutputFormat,
) -> Result<()> {
    let samples = read_trace(path)?;
    let records = replay(&samples, config)?;

    let classified = records.iter().filter(|r| r.verdict.is_some()).count();
    let anomalies = records
        .iter()
        .filter(|r| r.verdict.map(|v| v.is_anomaly).unwrap_or(false))
        .count();

    let shown: Vec<&ReplayRecord> = records
        .iter()
        .filter(|r| !anomalies_only || r.verdict.map(|v| v.is_anomaly).unwrap_or(false))
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        OutputFormat::Table => {
            println!("{}", "Latency Replay".bold());
            println!("{}", "=".repeat(60));
            let rows: Vec<ReplayRow> = shown.into_iter().map(ReplayRow::from).collect();
            print_table(&rows, format);
            println!();
            print_info(&format!(
                "{} samples, {} classified, {} anomalies",
                records.len(),
                classified,
                anomalies
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_warm_up_and_spike() {
        let mut samples = vec![12.0; 20];
        samples.push(500.0);

        let records = replay(&samples, DetectorConfig::default()).unwrap();

        assert_eq!(records.len(), 21);
        assert!(records[..19].iter().all(|r| r.verdict.is_none()));
        assert!(!records[19].verdict.unwrap().is_anomaly);
        assert!(records[20].verdict.unwrap().is_anomaly);
        assert_eq!(records[20].window_size, 21);
    }

    #[test]
    fn test_replay_rejects_invalid_config() {
        let config = DetectorConfig {
            contamination: 0.0,
            ..Default::default()
        };
        assert!(replay(&[12.0], config).is_err());
    }

    #[test]
    fn test_row_for_warming_up_tick() {
        let record = ReplayRecord {
            tick: 3,
            latency_ms: 12.0,
            window_size: 3,
            verdict: None,
        };
        let row = ReplayRow::from(&record);
        assert_eq!(row.score, "-");
        assert!(row.verdict.contains("warming up"));
    }
}
