//! Per-protocol position adapters.
//!
//! Each registered protocol is a variant of [`Protocol`]. A variant knows the
//! shape of its protocol's raw JSON and turns it into [`Position`]s through
//! [`Protocol::adapt`]; the aggregator never looks inside the raw payload.

mod amnis;
mod aries;
mod echelon;
pub mod fields;
mod fetcher;
mod hyperion;
mod joule;
mod kofi;
mod meso;
mod registry;
mod thala;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::market_data::{PriceMap, ResolvedToken, TokenRegistry};
use crate::models::{AssetId, Position, PositionKind};
use crate::numeric::{scale_amount, usd_value, DEFAULT_DECIMALS};

pub use fetcher::{HttpPositionFetcher, PositionFetcher, StaticPositionFetcher};
pub use registry::{ProtocolRegistry, RegisteredProtocol};

/// The shape family an adapter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterStyle {
    Lending,
    NestedLending,
    Liquidity,
    Staking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Echelon,
    Joule,
    Meso,
    Aries,
    Hyperion,
    Thala,
    Amnis,
    Kofi,
}

impl Protocol {
    /// Registration order. Portfolio output follows it.
    pub const ALL: [Protocol; 8] = [
        Protocol::Echelon,
        Protocol::Joule,
        Protocol::Meso,
        Protocol::Aries,
        Protocol::Hyperion,
        Protocol::Thala,
        Protocol::Amnis,
        Protocol::Kofi,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Protocol::Echelon => "echelon",
            Protocol::Joule => "joule",
            Protocol::Meso => "meso",
            Protocol::Aries => "aries",
            Protocol::Hyperion => "hyperion",
            Protocol::Thala => "thala",
            Protocol::Amnis => "amnis",
            Protocol::Kofi => "kofi",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(key))
    }

    pub fn style(self) -> AdapterStyle {
        match self {
            Protocol::Echelon | Protocol::Joule | Protocol::Meso => AdapterStyle::Lending,
            Protocol::Aries => AdapterStyle::NestedLending,
            Protocol::Hyperion | Protocol::Thala => AdapterStyle::Liquidity,
            Protocol::Amnis | Protocol::Kofi => AdapterStyle::Staking,
        }
    }

    /// Assets whose prices the adapter needs. Liquidity protocols report USD
    /// directly and need none.
    pub fn referenced_assets(self, raw: &Value) -> Vec<AssetId> {
        let mut ids: Vec<AssetId> = match self {
            Protocol::Echelon => echelon::assets(raw),
            Protocol::Joule => joule::assets(raw),
            Protocol::Meso => meso::assets(raw),
            Protocol::Aries => aries::assets(raw),
            Protocol::Hyperion | Protocol::Thala => Vec::new(),
            Protocol::Amnis => amnis::assets(raw),
            Protocol::Kofi => kofi::assets(raw),
        };
        ids.retain(|id| !id.is_unknown());
        ids.sort();
        ids.dedup();
        ids
    }

    /// Turn this protocol's raw response into positions. Total over any JSON.
    pub fn adapt(self, raw: &Value, ctx: &AdaptContext<'_>) -> Vec<Position> {
        match self {
            Protocol::Echelon => echelon::adapt(raw, ctx),
            Protocol::Joule => joule::adapt(raw, ctx),
            Protocol::Meso => meso::adapt(raw, ctx),
            Protocol::Aries => aries::adapt(raw, ctx),
            Protocol::Hyperion => hyperion::adapt(raw),
            Protocol::Thala => thala::adapt(raw),
            Protocol::Amnis => amnis::adapt(raw, ctx),
            Protocol::Kofi => kofi::adapt(raw, ctx),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// What an adapter may consult besides the raw payload.
#[derive(Debug, Clone, Copy)]
pub struct AdaptContext<'a> {
    /// Canonical queried address.
    pub address: &'a str,
    pub prices: &'a PriceMap,
    pub tokens: &'a TokenRegistry,
}

impl<'a> AdaptContext<'a> {
    pub fn new(address: &'a str, prices: &'a PriceMap, tokens: &'a TokenRegistry) -> Self {
        Self {
            address,
            prices,
            tokens,
        }
    }

    pub fn token(&self, asset: &str) -> ResolvedToken {
        self.tokens.resolve(asset, self.prices)
    }

    /// USD value of `raw_amount` of `asset`; zero when the asset is unpriced.
    pub fn value_of(&self, asset: &str, raw_amount: &str, decimals: u32) -> rust_decimal::Decimal {
        match self.prices.get(asset) {
            Some(info) => usd_value(scale_amount(raw_amount, decimals), info.usd_price),
            None => rust_decimal::Decimal::ZERO,
        }
    }

    /// Position denominated in a single asset. `extra` is merged into the
    /// metadata next to the asset address.
    pub fn asset_position(
        &self,
        protocol: Protocol,
        kind: PositionKind,
        asset: &str,
        raw_amount: &str,
        extra: Value,
    ) -> Position {
        let token = self.token(asset);
        let value = self.value_of(asset, raw_amount, token.decimals);

        Position::new(protocol.key(), kind, token.symbol)
            .with_amount(raw_amount, token.decimals)
            .with_value(value)
            .with_metadata(merge(json!({ "asset": asset }), extra))
    }

    /// Staking position: the amount is the staked principal, the value
    /// covers principal plus pending rewards.
    pub fn staking_position(
        &self,
        protocol: Protocol,
        label: &str,
        asset: Option<&str>,
        staked: &str,
        rewards: &str,
        extra: Value,
    ) -> Position {
        let (symbol, decimals, value) = match asset {
            Some(asset) => {
                let token = self.token(asset);
                let total = fields::add_raw(staked, rewards);
                let value = self.value_of(asset, &total, token.decimals);
                (token.symbol, token.decimals, value)
            }
            None => (label.to_string(), DEFAULT_DECIMALS, rust_decimal::Decimal::ZERO),
        };
        let label = if label.is_empty() { symbol } else { label.to_string() };

        Position::new(protocol.key(), PositionKind::Staking, label)
            .with_amount(staked, decimals)
            .with_value(value)
            .with_metadata(merge(
                json!({ "asset": asset, "rewardsRaw": rewards }),
                extra,
            ))
    }
}

fn merge(mut base: Value, extra: Value) -> Value {
    if let (Some(target), Value::Object(extra)) = (base.as_object_mut(), extra) {
        target.extend(extra);
    }
    base
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::market_data::TokenPrice;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    pub const ADDRESS: &str = "0xabc";

    pub fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    pub fn prices(entries: &[(&str, u32, &str)]) -> PriceMap {
        PriceMap::from_prices(entries.iter().map(|(addr, decimals, usd)| TokenPrice {
            token_address: None,
            fa_address: Some(addr.to_string()),
            symbol: String::new(),
            name: String::new(),
            decimals: *decimals,
            usd_price: d(usd),
        }))
    }

    pub fn adapt(protocol: Protocol, raw: &Value, prices: &PriceMap) -> Vec<Position> {
        let tokens = TokenRegistry::builtin();
        protocol.adapt(raw, &AdaptContext::new(ADDRESS, prices, &tokens))
    }
}
