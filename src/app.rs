//! Wiring shared by the CLI and the HTTP server.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::balances::IndexerBalanceSource;
use crate::config::{Config, HttpConfig};
use crate::market_data::providers::PanoraPriceSource;
use crate::market_data::{PriceCache, PriceResolver, TokenRegistry};
use crate::portfolio::PortfolioAggregator;
use crate::protocols::ProtocolRegistry;
use crate::transactions::TransactionWatcher;

/// HTTP client honouring `[http]` settings.
pub fn http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(concat!("aptfolio/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Long-lived services built from one [`Config`].
pub struct App {
    config: Config,
    aggregator: Arc<PortfolioAggregator>,
    watcher: TransactionWatcher,
}

impl App {
    pub fn from_config(config: Config) -> Result<Self> {
        let client = http_client(&config.http)?;

        let balances = IndexerBalanceSource::with_client(client.clone()).with_url(&config.indexer.url);
        let prices = PanoraPriceSource::with_client(client.clone())
            .with_base_url(&config.prices.url)
            .with_api_key(config.prices.api_key.clone());
        let resolver = PriceResolver::new(
            Arc::new(prices),
            Arc::new(PriceCache::new(config.prices.ttl)),
        );
        let protocols = ProtocolRegistry::from_config(&config.protocols, client.clone());
        debug!(protocols = protocols.len(), "protocol registry built");

        let aggregator = PortfolioAggregator::new(
            Arc::new(balances),
            Arc::new(resolver),
            protocols,
            Arc::new(TokenRegistry::builtin()),
        );
        let watcher = TransactionWatcher::from_config(client, &config.fullnode.url, &config.transactions);

        Ok(Self {
            config,
            aggregator: Arc::new(aggregator),
            watcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn aggregator(&self) -> &Arc<PortfolioAggregator> {
        &self.aggregator
    }

    pub fn watcher(&self) -> &TransactionWatcher {
        &self.watcher
    }
}
