//! Kofi Finance staking, keyed by staked-token symbol.
//!
//! Entries may name their token address under `token`. Without it the
//! stake is still listed, but cannot be priced.

use serde_json::{json, Value};

use super::fields::{entries, is_zero_amount, raw_amount, str_field};
use super::{AdaptContext, Protocol};
use crate::models::{AssetId, Position};

pub(super) fn assets(raw: &Value) -> Vec<AssetId> {
    entries(raw, &["data"])
        .into_iter()
        .filter_map(|(_, entry)| str_field(entry, &["token"]))
        .map(AssetId::parse)
        .collect()
}

pub(super) fn adapt(raw: &Value, ctx: &AdaptContext<'_>) -> Vec<Position> {
    entries(raw, &["data"])
        .into_iter()
        .filter_map(|(symbol, entry)| {
            let staked = raw_amount(entry, &["amount"]);
            let rewards = raw_amount(entry, &["pendingRewards"]);
            if is_zero_amount(&staked) && is_zero_amount(&rewards) {
                return None;
            }
            Some(ctx.staking_position(
                Protocol::Kofi,
                symbol,
                str_field(entry, &["token"]),
                &staked,
                &rewards,
                json!({}),
            ))
        })
        .collect()
}
