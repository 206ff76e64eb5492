//! Latency Sentinel CLI
//!
//! A command-line tool for replaying recorded latency traces through the
//! detector and inspecting a running sentinel.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{classify, replay, status};
use sentinel_core::DetectorConfig;
use std::path::PathBuf;

/// Latency Sentinel CLI
#[derive(Parser)]
#[command(name = "sentinelctl")]
#[command(author, version, about = "CLI for Latency Sentinel", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a latency trace (one value in ms per line) through the detector
    Replay {
        /// Trace file
        file: PathBuf,

        /// Only print ticks classified as anomalous
        #[arg(long)]
        anomalies_only: bool,

        #[command(flatten)]
        detector: DetectorArgs,
    },

    /// Classify a single sample against a history file
    Classify {
        /// History file (one value in ms per line)
        #[arg(long)]
        history: PathBuf,

        /// Sample to classify, in milliseconds
        query: f64,

        #[command(flatten)]
        detector: DetectorArgs,
    },

    /// Show health and readiness of a running sentinel
    Status {
        /// Sentinel API URL
        #[arg(long, env = "SENTINEL_AGENT_URL", default_value = "http://localhost:8080")]
        agent_url: String,
    },
}

/// Detector options shared by the offline commands
#[derive(Args, Clone, Debug)]
pub struct DetectorArgs {
    /// Samples kept in the sliding window
    #[arg(long, default_value_t = 50)]
    pub window_capacity: usize,

    /// History required before classifying
    #[arg(long, default_value_t = 20)]
    pub min_points: usize,

    /// Trees per forest
    #[arg(long, default_value_t = 100)]
    pub ensemble_size: usize,

    /// Expected fraction of anomalies, in (0, 1)
    #[arg(long, default_value_t = 0.1)]
    pub contamination: f64,

    /// Seed for tree construction
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<DetectorArgs> for DetectorConfig {
    fn from(args: DetectorArgs) -> Self {
        DetectorConfig {
            window_capacity: args.window_capacity,
            min_points: args.min_points,
            ensemble_size: args.ensemble_size,
            contamination: args.contamination,
            random_seed: args.seed,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            file,
            anomalies_only,
            detector,
        } => {
            replay::replay_file(&file, detector.into(), anomalies_only, cli.format)?;
        }
        Commands::Classify {
            history,
            query,
            detector,
        } => {
            classify::classify_sample(&history, query, detector.into(), cli.format)?;
        }
        Commands::Status { agent_url } => {
            let client = client::SentinelClient::new(&agent_url)?;
            status::show_status(&client, cli.format).await?;
        }
    }

    Ok(())
}
