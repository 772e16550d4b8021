//! Echelon lending markets: one flat map of asset -> supply/borrow.

use serde_json::{json, Value};
use tracing::debug;

use super::fields::{entries, is_zero_amount, raw_amount, str_field};
use super::{AdaptContext, Protocol};
use crate::models::{AssetId, Position, PositionKind};

pub(super) fn assets(raw: &Value) -> Vec<AssetId> {
    entries(raw, &["data"])
        .into_iter()
        .map(|(asset, _)| AssetId::parse(asset))
        .collect()
}

pub(super) fn adapt(raw: &Value, ctx: &AdaptContext<'_>) -> Vec<Position> {
    let mut positions = Vec::new();

    for (asset, entry) in entries(raw, &["data"]) {
        if !entry.is_object() {
            debug!(protocol = "echelon", asset = %asset, "skipping non-object market entry");
            continue;
        }
        let market = str_field(entry, &["market"]).map(str::to_string);

        for (kind, key) in [(PositionKind::Supply, "supply"), (PositionKind::Borrow, "borrow")] {
            let amount = raw_amount(entry, &[key]);
            if is_zero_amount(&amount) {
                continue;
            }
            positions.push(ctx.asset_position(
                Protocol::Echelon,
                kind,
                asset,
                &amount,
                json!({ "market": market }),
            ));
        }
    }

    positions
}
