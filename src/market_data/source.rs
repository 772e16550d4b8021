use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::AssetId;

/// A USD quote for one asset as returned by a price source.
///
/// An asset may be known under a fungible-asset address, a legacy coin path,
/// or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPrice {
    pub token_address: Option<String>,
    pub fa_address: Option<String>,
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
    pub usd_price: Decimal,
}

#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch quotes for a whole batch in one upstream call.
    async fn fetch_prices(&self, asset_ids: &[AssetId]) -> Result<Vec<TokenPrice>>;

    fn name(&self) -> &str;
}

/// Source that never knows any price.
pub struct NoopPriceSource;

#[async_trait::async_trait]
impl PriceSource for NoopPriceSource {
    async fn fetch_prices(&self, _asset_ids: &[AssetId]) -> Result<Vec<TokenPrice>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
