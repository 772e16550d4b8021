use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::TokenPrice;
use crate::models::AssetId;

/// Resolved price and metadata for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceInfo {
    pub usd_price: Decimal,
    pub decimals: u32,
    pub symbol: String,
    pub name: String,
}

/// Prices keyed by canonical asset id.
///
/// Each upstream entry is stored under every surface form it was reported
/// with, so callers can look up by FA address or coin path alike. An id
/// missing from the map means "price unknown".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceMap {
    entries: HashMap<AssetId, PriceInfo>,
}

impl PriceMap {
    pub fn from_prices(prices: impl IntoIterator<Item = TokenPrice>) -> Self {
        let mut map = Self::default();
        for price in prices {
            map.insert(price);
        }
        map
    }

    pub fn insert(&mut self, price: TokenPrice) {
        let info = PriceInfo {
            usd_price: price.usd_price,
            decimals: price.decimals,
            symbol: price.symbol,
            name: price.name,
        };

        for raw in [price.fa_address.as_deref(), price.token_address.as_deref()]
            .into_iter()
            .flatten()
        {
            let id = AssetId::parse(raw);
            if !id.is_unknown() {
                self.entries.insert(id, info.clone());
            }
        }
    }

    /// Look up by any surface form of an asset identifier.
    pub fn get(&self, raw: &str) -> Option<&PriceInfo> {
        self.get_id(&AssetId::parse(raw))
    }

    pub fn get_id(&self, id: &AssetId) -> Option<&PriceInfo> {
        if id.is_unknown() {
            return None;
        }
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc() -> TokenPrice {
        TokenPrice {
            token_address: Some(
                "0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa::asset::USDC"
                    .to_string(),
            ),
            fa_address: Some(
                "0x2b3be0a97a73c87ff62cbdd36837a9fb5bbd1d7f06a73b7ed62ec15c5326c1b8".to_string(),
            ),
            symbol: "lzUSDC".to_string(),
            name: "LayerZero USD Coin".to_string(),
            decimals: 6,
            usd_price: Decimal::ONE,
        }
    }

    #[test]
    fn reachable_by_both_forms() {
        let map = PriceMap::from_prices([usdc()]);
        assert_eq!(map.len(), 2);
        assert!(map
            .get("0xF22BEDE237A07E121B56D91A491EB7BCDFD1F5907926A9E58338F964A01B17FA::asset::USDC")
            .is_some());
        assert!(map
            .get("0x02b3be0a97a73c87ff62cbdd36837a9fb5bbd1d7f06a73b7ed62ec15c5326c1b8")
            .is_some());
    }

    #[test]
    fn empty_id_is_never_found() {
        let mut price = usdc();
        price.fa_address = Some(String::new());
        let map = PriceMap::from_prices([price]);
        assert_eq!(map.len(), 1);
        assert!(map.get("").is_none());
    }
}
