//! API client for a running sentinel's health endpoints

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

/// Client for the sentinel's HTTP API
pub struct SentinelClient {
    client: Client,
    base_url: Url,
}

impl SentinelClient {
    /// Create a new client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid sentinel URL")?;

        Ok(Self { client, base_url })
    }

    /// GET a health-style endpoint.
    ///
    /// These endpoints answer 503 with a JSON body when not operational, so
    /// that status is returned alongside the parsed body instead of failing.
    pub async fn get_probe_endpoint<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<(StatusCode, T)> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to reach sentinel")?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::SERVICE_UNAVAILABLE {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        let body = response.json().await.context("Failed to parse response")?;
        Ok((status, body))
    }
}
