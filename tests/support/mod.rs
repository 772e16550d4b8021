#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use aptfolio::balances::{BalanceSource, StaticBalanceSource};
use aptfolio::clock::FixedClock;
use aptfolio::market_data::{PriceCache, PriceResolver, PriceSource, TokenPrice, TokenRegistry};
use aptfolio::models::{AssetId, RawBalance};
use aptfolio::portfolio::PortfolioAggregator;
use aptfolio::protocols::{PositionFetcher, ProtocolRegistry};

pub const APT_COIN: &str = "0x1::aptos_coin::AptosCoin";
pub const USDC: &str = "0xbae207659db88bea0cbead6da0ed00aac12edcdda169e591cd41c94180b46f3b";

pub fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn token_price(fa: &str, coin: Option<&str>, symbol: &str, decimals: u32, usd: &str) -> TokenPrice {
    TokenPrice {
        token_address: coin.map(str::to_string),
        fa_address: Some(fa.to_string()),
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        decimals,
        usd_price: d(usd),
    }
}

/// APT (both forms) at $5 and USDC at $1.
pub fn standard_prices() -> Vec<TokenPrice> {
    vec![
        token_price("0xa", Some(APT_COIN), "APT", 8, "5"),
        token_price(USDC, None, "USDC", 6, "1"),
    ]
}

/// Price source that records every batch it is asked for.
#[derive(Default)]
pub struct MockPriceSource {
    prices: Vec<TokenPrice>,
    fail: bool,
    calls: AtomicUsize,
    batches: Mutex<Vec<Vec<AssetId>>>,
}

impl MockPriceSource {
    pub fn new(prices: Vec<TokenPrice>) -> Self {
        Self {
            prices,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> Vec<Vec<AssetId>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn fetch_prices(&self, asset_ids: &[AssetId]) -> Result<Vec<TokenPrice>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(asset_ids.to_vec());
        if self.fail {
            return Err(anyhow!("price service unavailable"));
        }
        Ok(self.prices.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub struct FailingBalanceSource;

#[async_trait]
impl BalanceSource for FailingBalanceSource {
    async fn fetch_balances(&self, _address: &str) -> Result<Vec<RawBalance>> {
        Err(anyhow!("indexer unavailable"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

pub struct FailingFetcher;

#[async_trait]
impl PositionFetcher for FailingFetcher {
    async fn fetch_positions(&self, _address: &str) -> Result<Value> {
        Err(anyhow!("503 Service Unavailable"))
    }
}

/// Records the addresses it is queried with.
#[derive(Default)]
pub struct RecordingFetcher {
    pub payload: Value,
    pub addresses: Mutex<Vec<String>>,
}

#[async_trait]
impl PositionFetcher for RecordingFetcher {
    async fn fetch_positions(&self, address: &str) -> Result<Value> {
        self.addresses.lock().unwrap().push(address.to_string());
        Ok(self.payload.clone())
    }
}

pub fn balances(rows: &[(&str, &str)]) -> Arc<StaticBalanceSource> {
    Arc::new(StaticBalanceSource::new(
        rows.iter()
            .map(|(addr, amount)| RawBalance::new(*addr, *amount))
            .collect(),
    ))
}

pub fn aggregator(
    balances: Arc<dyn BalanceSource>,
    prices: Arc<MockPriceSource>,
    protocols: ProtocolRegistry,
) -> PortfolioAggregator {
    let resolver = PriceResolver::new(prices, Arc::new(PriceCache::default()));
    PortfolioAggregator::new(
        balances,
        Arc::new(resolver),
        protocols,
        Arc::new(TokenRegistry::builtin()),
    )
    .with_clock(Arc::new(FixedClock::new(fixed_now())))
}
