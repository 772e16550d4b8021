use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AssetId;

/// One non-zero balance row as reported by the balance indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBalance {
    pub asset_address: String,
    /// Integer amount in the asset's smallest unit.
    pub raw_amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transaction_timestamp: Option<String>,
}

impl RawBalance {
    pub fn new(asset_address: impl Into<String>, raw_amount: impl Into<String>) -> Self {
        Self {
            asset_address: asset_address.into(),
            raw_amount: raw_amount.into(),
            last_transaction_timestamp: None,
        }
    }
}

/// A valued wallet holding.
///
/// `unit_price_usd` and `value_usd` are `None` together when no price is
/// known, so "no price" stays distinguishable from "worth zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenLineItem {
    pub asset_id: AssetId,
    /// The address exactly as the indexer reported it.
    pub asset_address: String,
    pub display_symbol: String,
    pub display_name: String,
    pub decimals: u32,
    pub raw_amount: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub unit_price_usd: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub value_usd: Option<Decimal>,
}

impl TokenLineItem {
    /// USD value with unknown prices counted as zero.
    pub fn value_or_zero(&self) -> Decimal {
        self.value_usd.unwrap_or(Decimal::ZERO)
    }
}
