//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use sentinel_core::Verdict;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a latency in milliseconds
pub fn format_latency(latency_ms: f64) -> String {
    if latency_ms >= 1000.0 {
        format!("{:.2}s", latency_ms / 1000.0)
    } else {
        format!("{:.1}ms", latency_ms)
    }
}

/// Format an anomaly score or threshold
pub fn format_score(score: f64) -> String {
    format!("{:.3}", score)
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Render a verdict, or the warm-up marker when there is none yet
pub fn color_verdict(verdict: Option<&Verdict>) -> String {
    match verdict {
        Some(v) if v.is_anomaly => "ANOMALY".red().bold().to_string(),
        Some(_) => "normal".green().to_string(),
        None => "warming up".dimmed().to_string(),
    }
}
