//! One-shot classification against a history file

use anyhow::Result;
use colored::Colorize;
use sentinel_core::{DetectorConfig, IsolationForestDetector};
use std::path::Path;

use super::trace::read_trace;
use crate::output::{color_verdict, format_latency, format_score, OutputFormat};

/// Classify `query` against the samples in `history_path`
pub fn classify_sample(
    history_path: &Path,
    query: f64,
    config: DetectorConfig,
    format: OutputFormat,
) -> Result<()> {
    let history = read_trace(history_path)?;
    let detector = IsolationForestDetector::new(config)?;
    let verdict = detector.classify(&history, query)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        OutputFormat::Table => {
            println!("{}", "Classification".bold());
            println!("{}", "=".repeat(40));
            println!("History:   {} samples", history.len());
            println!("Query:     {}", format_latency(query).cyan());
            println!("Score:     {}", format_score(verdict.anomaly_score));
            println!("Threshold: {}", format_score(verdict.threshold));
            println!("Verdict:   {}", color_verdict(Some(&verdict)));
        }
    }

    Ok(())
}
