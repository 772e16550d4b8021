//! Amnis liquid staking.

use serde_json::{json, Value};
use tracing::debug;

use super::fields::{array, is_zero_amount, raw_amount, str_field, str_or};
use super::{AdaptContext, Protocol};
use crate::models::{AssetId, Position};

pub(super) fn assets(raw: &Value) -> Vec<AssetId> {
    array(raw, &["stakes"])
        .iter()
        .filter_map(|stake| str_field(stake, &["token"]))
        .map(AssetId::parse)
        .collect()
}

pub(super) fn adapt(raw: &Value, ctx: &AdaptContext<'_>) -> Vec<Position> {
    let mut positions = Vec::new();

    for stake in array(raw, &["stakes"]) {
        let Some(token) = str_field(stake, &["token"]) else {
            debug!(protocol = "amnis", "skipping stake without token");
            continue;
        };
        let staked = raw_amount(stake, &["staked"]);
        let rewards = raw_amount(stake, &["rewards"]);
        if is_zero_amount(&staked) && is_zero_amount(&rewards) {
            continue;
        }

        let pool = str_or(stake, &["pool"], "");
        positions.push(ctx.staking_position(
            Protocol::Amnis,
            &pool,
            Some(token),
            &staked,
            &rewards,
            json!({ "pool": pool }),
        ));
    }

    positions
}
