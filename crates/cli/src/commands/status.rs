//! Health and readiness of a running sentinel

use anyhow::Result;
use colored::Colorize;
use sentinel_core::{HealthResponse, ReadinessResponse};
use serde::Serialize;
use tabled::Tabled;

use crate::client::SentinelClient;
use crate::output::{color_status, print_success, print_table, print_warning, OutputFormat};

/// Row for the component table
#[derive(Tabled, Serialize)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Last Check")]
    last_check: String,
}

#[derive(Serialize)]
struct StatusReport {
    health: HealthResponse,
    readiness: ReadinessResponse,
}

/// Fetch and print `/healthz` and `/readyz`
pub async fn show_status(client: &SentinelClient, format: OutputFormat) -> Result<()> {
    let (_, health): (_, HealthResponse) = client.get_probe_endpoint("healthz").await?;
    let (_, readiness): (_, ReadinessResponse) = client.get_probe_endpoint("readyz").await?;

    match format {
        OutputFormat::Json => {
            let report = StatusReport { health, readiness };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            println!("{}", "Sentinel Status".bold());
            println!("{}", "=".repeat(60));
            println!("Overall: {}", color_status(health.status.as_str()));
            println!();

            let mut rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, component)| ComponentRow {
                    name: name.clone(),
                    status: color_status(component.status.as_str()),
                    message: component.message.clone().unwrap_or_default(),
                    last_check: chrono::DateTime::from_timestamp(component.last_check_timestamp, 0)
                        .map(|t| t.format("%H:%M:%S").to_string())
                        .unwrap_or_default(),
                })
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            print_table(&rows, format);
            println!();

            if readiness.ready {
                print_success("Sentinel is ready");
            } else {
                print_warning(&format!(
                    "Sentinel is not ready: {}",
                    readiness.reason.as_deref().unwrap_or("unknown reason")
                ));
            }
        }
    }

    Ok(())
}
