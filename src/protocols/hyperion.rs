//! Hyperion concentrated-liquidity positions.
//!
//! The API values each position in USD itself. Unclaimed fees and farm
//! rewards arrive as itemized lists, one entry per reward token.

use serde_json::{json, Value};
use tracing::debug;

use super::fields::{array, bool_or, decimal, str_field, str_or, sum_usd};
use super::Protocol;
use crate::models::{Position, PositionKind};

pub(super) fn adapt(raw: &Value) -> Vec<Position> {
    let mut positions = Vec::new();

    for item in array(raw, &["data"]) {
        if !item.is_object() {
            debug!(protocol = "hyperion", "skipping non-object position");
            continue;
        }

        let pool_id = str_field(item, &["position", "pool", "poolId"]);
        let object_id = str_field(item, &["position", "objectId"]);
        let label = format!(
            "{}/{}",
            str_or(item, &["position", "pool", "token1Info", "symbol"], "?"),
            str_or(item, &["position", "pool", "token2Info", "symbol"], "?"),
        );

        positions.push(
            Position::new(Protocol::Hyperion.key(), PositionKind::Liquidity, label.clone())
                .with_value(decimal(item, &["value"]))
                .with_metadata(json!({
                    "poolId": pool_id,
                    "objectId": object_id,
                    "isActive": bool_or(item, &["isActive"], true),
                })),
        );

        for (source, path, suffix) in [
            ("fees", ["fees", "unclaimed"], "fees"),
            ("farm", ["farm", "unclaimed"], "farm rewards"),
        ] {
            let items = array(item, &path);
            let total = sum_usd(items, "amountUSD");
            if total.is_zero() {
                continue;
            }
            positions.push(
                Position::new(
                    Protocol::Hyperion.key(),
                    PositionKind::FarmingReward,
                    format!("{label} {suffix}"),
                )
                .with_value(total)
                .with_metadata(json!({
                    "poolId": pool_id,
                    "objectId": object_id,
                    "source": source,
                    "items": items.len(),
                })),
            );
        }
    }

    positions
}
