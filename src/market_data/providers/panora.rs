//! Panora price provider.
//!
//! Panora aggregates Aptos token prices. `/prices?tokenAddress=a,b,c` returns
//! one entry per known asset, carrying both its legacy coin path
//! (`tokenAddress`) and its fungible-asset address (`faAddress`).

use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::market_data::{PriceSource, TokenPrice};
use crate::models::AssetId;
use crate::numeric::{decimal_from_json, DEFAULT_DECIMALS};

const PANORA_API_BASE: &str = "https://api.panora.exchange";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PanoraPrice {
    token_address: Option<String>,
    fa_address: Option<String>,
    symbol: Option<String>,
    name: Option<String>,
    decimals: Option<u32>,
    usd_price: Option<Value>,
}

impl PanoraPrice {
    fn into_token_price(self) -> Option<TokenPrice> {
        let usd_price = self.usd_price.as_ref().and_then(decimal_from_json)?;
        if self.token_address.is_none() && self.fa_address.is_none() {
            return None;
        }
        Some(TokenPrice {
            token_address: self.token_address,
            fa_address: self.fa_address,
            symbol: self.symbol.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            decimals: self.decimals.unwrap_or(DEFAULT_DECIMALS),
            usd_price,
        })
    }
}

/// Panora HTTP price source.
pub struct PanoraPriceSource {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl PanoraPriceSource {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: PANORA_API_BASE.to_string(),
            api_key: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);
        self
    }
}

impl Default for PanoraPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PriceSource for PanoraPriceSource {
    async fn fetch_prices(&self, asset_ids: &[AssetId]) -> Result<Vec<TokenPrice>> {
        if asset_ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = asset_ids
            .iter()
            .map(AssetId::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let mut request = self
            .client
            .get(format!("{}/prices", self.base_url))
            .query(&[("tokenAddress", joined.as_str())])
            .header("Accept", "application/json")
            .header("User-Agent", concat!("aptfolio/", env!("CARGO_PKG_VERSION")));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key.expose_secret());
        }

        let response = request.send().await.context("Panora request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Panora API error: {} - {}", status, body));
        }

        let entries: Vec<Value> = response
            .json()
            .await
            .context("Panora returned a non-array body")?;

        let total = entries.len();
        let prices: Vec<TokenPrice> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<PanoraPrice>(entry).ok())
            .filter_map(PanoraPrice::into_token_price)
            .collect();

        if prices.len() < total {
            debug!(
                skipped = total - prices.len(),
                "dropped Panora entries without a usable price or address"
            );
        }

        Ok(prices)
    }

    fn name(&self) -> &str {
        "panora"
    }
}
