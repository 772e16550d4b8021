//! Meso Finance: per-asset amount and (possibly negative) debt.

use serde_json::{json, Value};
use tracing::debug;

use super::fields::{array, is_zero_amount, raw_amount, str_field};
use super::{AdaptContext, Protocol};
use crate::models::{AssetId, Position, PositionKind};

pub(super) fn assets(raw: &Value) -> Vec<AssetId> {
    array(raw, &["assets"])
        .iter()
        .filter_map(|item| str_field(item, &["asset"]))
        .map(AssetId::parse)
        .collect()
}

pub(super) fn adapt(raw: &Value, ctx: &AdaptContext<'_>) -> Vec<Position> {
    let mut positions = Vec::new();

    for item in array(raw, &["assets"]) {
        let Some(asset) = str_field(item, &["asset"]) else {
            debug!(protocol = "meso", "skipping entry without asset");
            continue;
        };

        // raw_amount keeps magnitudes, so a negative debt reads as its absolute value.
        for (kind, key) in [(PositionKind::Supply, "amount"), (PositionKind::Borrow, "debt")] {
            let amount = raw_amount(item, &[key]);
            if is_zero_amount(&amount) {
                continue;
            }
            positions.push(ctx.asset_position(Protocol::Meso, kind, asset, &amount, json!({})));
        }
    }

    positions
}
