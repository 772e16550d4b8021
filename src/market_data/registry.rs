//! Well-known Aptos assets.
//!
//! Used for decimals and display names when the price source does not know
//! an asset. Price-source metadata always wins over these entries.

use std::collections::HashMap;

use super::PriceMap;
use crate::models::AssetId;
use crate::numeric::DEFAULT_DECIMALS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMeta {
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
}

/// Symbol, name and decimals for an asset, from whichever source knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
}

#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    entries: HashMap<AssetId, TokenMeta>,
}

const APT_COIN: &str = "0x1::aptos_coin::AptosCoin";
const APT_FA: &str = "0xa";
const USDC_FA: &str = "0xbae207659db88bea0cbead6da0ed00aac12edcdda169e591cd41c94180b46f3b";
const USDT_FA: &str = "0x357b0b74bc833e95a115ad22604854d6b0fca151cecd94111770e5d6ffc9dc2b";
const LZ_ASSET: &str = "0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa::asset";
const AMNIS: &str = "0x111ae3e5bc816a5e63c2da97d0aa3886519e0cd5e4b046659fa35796bd11542a";
const THALA_STAKING: &str =
    "0xfaf4e633ae9eb31366c9ca24214231760926576c7b625313b3688b5e900731f6::staking";

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the assets most Aptos wallets hold.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(APT_COIN, "APT", "Aptos Coin", 8);
        registry.register(APT_FA, "APT", "Aptos Coin", 8);
        registry.register(USDC_FA, "USDC", "USD Coin", 6);
        registry.register(USDT_FA, "USDt", "Tether USD", 6);
        registry.register(&format!("{LZ_ASSET}::USDC"), "lzUSDC", "LayerZero USD Coin", 6);
        registry.register(&format!("{LZ_ASSET}::USDT"), "lzUSDT", "LayerZero Tether USD", 6);
        registry.register(&format!("{LZ_ASSET}::WETH"), "lzWETH", "LayerZero Wrapped Ether", 6);
        registry.register(&format!("{AMNIS}::amapt_token::AmnisApt"), "amAPT", "Amnis Aptos Coin", 8);
        registry.register(
            &format!("{AMNIS}::stapt_token::StakedApt"),
            "stAPT",
            "Staked Aptos Coin",
            8,
        );
        registry.register(&format!("{THALA_STAKING}::ThalaAPT"), "thAPT", "Thala APT", 8);
        registry.register(
            &format!("{THALA_STAKING}::StakedThalaAPT"),
            "sthAPT",
            "Staked Thala APT",
            8,
        );
        registry
    }

    pub fn register(&mut self, address: &str, symbol: &str, name: &str, decimals: u32) {
        let id = AssetId::parse(address);
        if id.is_unknown() {
            return;
        }
        self.entries.insert(
            id,
            TokenMeta {
                symbol: symbol.to_string(),
                name: name.to_string(),
                decimals,
            },
        );
    }

    pub fn get(&self, raw: &str) -> Option<&TokenMeta> {
        let id = AssetId::parse(raw);
        if id.is_unknown() {
            return None;
        }
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve display metadata: price map, then this registry, then a
    /// fallback derived from the address with [`DEFAULT_DECIMALS`].
    pub fn resolve(&self, raw: &str, prices: &PriceMap) -> ResolvedToken {
        let known = self.get(raw);
        if let Some(info) = prices.get(raw) {
            let (symbol, name) = match known {
                Some(meta) => (meta.symbol.clone(), meta.name.clone()),
                None => (fallback_label(raw), fallback_label(raw)),
            };
            return ResolvedToken {
                symbol: non_empty_or(&info.symbol, &symbol),
                name: non_empty_or(&info.name, &name),
                decimals: info.decimals,
            };
        }
        if let Some(meta) = known {
            return ResolvedToken {
                symbol: meta.symbol.clone(),
                name: meta.name.clone(),
                decimals: meta.decimals,
            };
        }
        let label = fallback_label(raw);
        ResolvedToken {
            symbol: label.clone(),
            name: label,
            decimals: DEFAULT_DECIMALS,
        }
    }

    pub fn decimals(&self, raw: &str, prices: &PriceMap) -> u32 {
        self.resolve(raw, prices).decimals
    }
}

/// Suffix after the last `::`, or the address itself.
pub fn fallback_label(raw: &str) -> String {
    let raw = raw.trim();
    raw.rsplit("::").next().unwrap_or(raw).to_string()
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
