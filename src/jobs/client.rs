//! HTTP client for the ScraperAPI async job endpoints.

use super::api::{JobApi, JobTicket, StatusReport};
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

const SCRAPERAPI_BASE: &str = "https://async.scraperapi.com";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SingleJobRequest<'a> {
    api_key: &'a str,
    url: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchJobRequest<'a> {
    api_key: &'a str,
    urls: &'a [String],
}

/// ScraperAPI async client.
pub struct ScraperApiClient {
    client: Client,
    api_key: String,
    base_url: Option<String>,
}

impl ScraperApiClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, None)
    }

    /// Creates a new client with an optional custom base URL (for testing).
    pub fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let mut builder = Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(70))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, api_key, base_url })
    }

    /// Returns the base URL (custom for testing, or the public endpoint).
    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(SCRAPERAPI_BASE)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        debug!("POST {}", url);

        let payload = serde_json::to_vec(body).context("Failed to encode request body")?;
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(payload)
            .send()
            .await
            .context("Failed to send request")?;

        Self::read_json(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request")?;

        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: wreq::Response) -> Result<T> {
        let status = response.status();
        debug!("Response status: {}", status);

        if status == 401 || status == 403 {
            anyhow::bail!("ScraperAPI rejected the API key (status {})", status);
        }

        if status == 429 {
            warn!("Rate limited (429). Your ScraperAPI plan may be out of concurrent jobs.");
            anyhow::bail!("Rate limited by ScraperAPI. Try again later.");
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        let text = response.text().await.context("Failed to read response body")?;
        serde_json::from_str(&text).context("Failed to decode ScraperAPI response")
    }
}

#[async_trait]
impl JobApi for ScraperApiClient {
    async fn submit_single(&self, url: &str) -> Result<JobTicket> {
        let endpoint = format!("{}/jobs", self.base_url());

        info!("Submitting job for {}", url);
        self.post_json(&endpoint, &SingleJobRequest { api_key: &self.api_key, url }).await
    }

    async fn submit_batch(&self, urls: &[String]) -> Result<Vec<JobTicket>> {
        let endpoint = format!("{}/batchjobs", self.base_url());

        info!("Submitting batch of {} jobs", urls.len());
        self.post_json(&endpoint, &BatchJobRequest { api_key: &self.api_key, urls }).await
    }

    async fn status(&self, status_url: &str) -> Result<StatusReport> {
        self.get_json(status_url).await
    }
}
