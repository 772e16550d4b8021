use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::models::{long_form, RawBalance};
use crate::numeric::raw_amount_string;

const APTOS_INDEXER_URL: &str = "https://api.mainnet.aptoslabs.com/v1/graphql";

const BALANCES_QUERY: &str = r#"
query WalletBalances($address: String!) {
  current_fungible_asset_balances(
    where: { owner_address: { _eq: $address }, amount: { _gt: 0 } }
  ) {
    asset_type
    amount
    last_transaction_timestamp
  }
}
"#;

/// Where raw wallet balances come from.
#[async_trait::async_trait]
pub trait BalanceSource: Send + Sync {
    /// Non-zero balances held by `address`.
    async fn fetch_balances(&self, address: &str) -> Result<Vec<RawBalance>>;

    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<BalancesData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct BalancesData {
    #[serde(default)]
    current_fungible_asset_balances: Vec<BalanceRow>,
}

#[derive(Debug, Deserialize)]
struct BalanceRow {
    asset_type: Option<String>,
    amount: Option<Value>,
    last_transaction_timestamp: Option<String>,
}

/// Aptos GraphQL indexer client.
pub struct IndexerBalanceSource {
    client: reqwest::Client,
    url: String,
}

impl IndexerBalanceSource {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            url: APTOS_INDEXER_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl Default for IndexerBalanceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BalanceSource for IndexerBalanceSource {
    async fn fetch_balances(&self, address: &str) -> Result<Vec<RawBalance>> {
        let body = json!({
            "query": BALANCES_QUERY,
            "variables": { "address": long_form(address) },
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .context("Indexer request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Indexer error: {} - {}", status, body));
        }

        let parsed: GraphQlResponse = response
            .json()
            .await
            .context("Failed to parse indexer response")?;

        if let Some(first) = parsed.errors.first() {
            return Err(anyhow!("Indexer GraphQL error: {}", first.message));
        }

        let rows = parsed
            .data
            .map(|d| d.current_fungible_asset_balances)
            .unwrap_or_default();

        let balances: Vec<RawBalance> = rows
            .into_iter()
            .filter_map(|row| {
                let asset_address = row.asset_type.filter(|a| !a.trim().is_empty())?;
                Some(RawBalance {
                    asset_address,
                    raw_amount: raw_amount_string(row.amount.as_ref()),
                    last_transaction_timestamp: row.last_transaction_timestamp,
                })
            })
            .collect();

        debug!(address = %address, count = balances.len(), "fetched wallet balances");
        Ok(balances)
    }

    fn name(&self) -> &str {
        "aptos-indexer"
    }
}

/// Fixed balances, for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticBalanceSource {
    balances: Vec<RawBalance>,
}

impl StaticBalanceSource {
    pub fn new(balances: Vec<RawBalance>) -> Self {
        Self { balances }
    }
}

#[async_trait::async_trait]
impl BalanceSource for StaticBalanceSource {
    async fn fetch_balances(&self, _address: &str) -> Result<Vec<RawBalance>> {
        Ok(self.balances.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
