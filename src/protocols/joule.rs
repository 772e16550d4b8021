//! Joule: positions, each holding lend and borrow lists.

use serde_json::{json, Value};
use tracing::debug;

use super::fields::{array, is_zero_amount, raw_amount, str_field};
use super::{AdaptContext, Protocol};
use crate::models::{AssetId, Position, PositionKind};

const SIDES: [(PositionKind, &str); 2] = [(PositionKind::Supply, "lends"), (PositionKind::Borrow, "borrows")];

pub(super) fn assets(raw: &Value) -> Vec<AssetId> {
    array(raw, &["positions"])
        .iter()
        .flat_map(|position| {
            SIDES
                .iter()
                .flat_map(move |(_, side)| array(position, &[*side]).iter())
        })
        .filter_map(|item| str_field(item, &["tokenAddress"]))
        .map(AssetId::parse)
        .collect()
}

pub(super) fn adapt(raw: &Value, ctx: &AdaptContext<'_>) -> Vec<Position> {
    let mut positions = Vec::new();

    for position in array(raw, &["positions"]) {
        let position_id = str_field(position, &["positionId"]).map(str::to_string);

        for (kind, side) in SIDES {
            for item in array(position, &[side]) {
                let Some(asset) = str_field(item, &["tokenAddress"]) else {
                    debug!(protocol = "joule", side, "skipping entry without tokenAddress");
                    continue;
                };
                let amount = raw_amount(item, &["amount"]);
                if is_zero_amount(&amount) {
                    continue;
                }
                positions.push(ctx.asset_position(
                    Protocol::Joule,
                    kind,
                    asset,
                    &amount,
                    json!({ "positionId": position_id }),
                ));
            }
        }
    }

    positions
}
