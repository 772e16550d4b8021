// src/portfolio/service.rs
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use serde_json::Value;
use tracing::info;

use crate::balances::{normalize_balances, BalanceSource};
use crate::clock::{Clock, SystemClock};
use crate::market_data::{PriceResolver, TokenRegistry};
use crate::models::{validate_account_address, AssetId, Portfolio, ProtocolPortfolio};
use crate::protocols::{AdaptContext, ProtocolRegistry};

use super::isolate;

/// Builds a [`Portfolio`] for one address from the wallet and every
/// registered protocol.
pub struct PortfolioAggregator {
    balances: Arc<dyn BalanceSource>,
    prices: Arc<PriceResolver>,
    protocols: ProtocolRegistry,
    tokens: Arc<TokenRegistry>,
    clock: Arc<dyn Clock>,
}

impl PortfolioAggregator {
    pub fn new(
        balances: Arc<dyn BalanceSource>,
        prices: Arc<PriceResolver>,
        protocols: ProtocolRegistry,
        tokens: Arc<TokenRegistry>,
    ) -> Self {
        Self {
            balances,
            prices,
            protocols,
            tokens,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn protocols(&self) -> &ProtocolRegistry {
        &self.protocols
    }

    /// Wallet balance failures are returned as errors. Protocol failures
    /// never are: the protocol is reported with no positions instead.
    pub async fn build_portfolio(&self, address: &str) -> Result<Portfolio> {
        let address = validate_account_address(address)?;

        let protocol_fetches = join_all(
            self.protocols
                .iter()
                .map(|entry| entry.fetcher.fetch_positions(&address)),
        );
        let (balances, fetched) = tokio::join!(self.balances.fetch_balances(&address), protocol_fetches);
        let balances = balances
            .with_context(|| format!("Failed to fetch wallet balances from {}", self.balances.name()))?;

        let mut wanted: Vec<AssetId> = balances
            .iter()
            .map(|b| AssetId::parse(&b.asset_address))
            .collect();
        for (entry, raw) in self.protocols.iter().zip(&fetched) {
            if let Ok(raw) = raw {
                wanted.extend(entry.protocol.referenced_assets(raw));
            }
        }
        let prices = self.prices.get_prices(&wanted).await;

        let tokens = normalize_balances(&balances, &prices);

        let ctx = AdaptContext::new(&address, &prices, &self.tokens);
        let protocols: Vec<ProtocolPortfolio> = self
            .protocols
            .iter()
            .zip(fetched)
            .map(|(entry, raw)| {
                let protocol = entry.protocol;
                isolate(protocol.key(), raw, |raw: &Value| protocol.adapt(raw, &ctx))
            })
            .collect();

        let portfolio = Portfolio::new(address, tokens, protocols, self.clock.now());
        info!(
            address = %portfolio.address,
            tokens = portfolio.tokens.len(),
            protocols = portfolio.protocols.len(),
            total_value_usd = %portfolio.total_value_usd(),
            "portfolio built"
        );
        Ok(portfolio)
    }
}
