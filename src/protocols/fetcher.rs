use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::config::ADDRESS_PLACEHOLDER;

/// Fetches one protocol's raw position payload for an address.
#[async_trait::async_trait]
pub trait PositionFetcher: Send + Sync {
    async fn fetch_positions(&self, address: &str) -> Result<Value>;
}

/// GET a URL template with `{address}` substituted.
pub struct HttpPositionFetcher {
    client: reqwest::Client,
    url_template: String,
}

impl HttpPositionFetcher {
    pub fn new(client: reqwest::Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    pub fn url_for(&self, address: &str) -> String {
        self.url_template.replace(ADDRESS_PLACEHOLDER, address)
    }
}

#[async_trait::async_trait]
impl PositionFetcher for HttpPositionFetcher {
    async fn fetch_positions(&self, address: &str) -> Result<Value> {
        let url = self.url_for(address);
        debug!(url = %url, "fetching protocol positions");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Position endpoint error: {} - {}", status, body));
        }

        response
            .json()
            .await
            .with_context(|| format!("Malformed JSON from {url}"))
    }
}

/// Returns a fixed payload.
#[derive(Debug, Clone)]
pub struct StaticPositionFetcher {
    payload: Value,
}

impl StaticPositionFetcher {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }
}

#[async_trait::async_trait]
impl PositionFetcher for StaticPositionFetcher {
    async fn fetch_positions(&self, _address: &str) -> Result<Value> {
        Ok(self.payload.clone())
    }
}
