//! Thala liquidity pools. Rewards are bucketed into farm and fee totals.

use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::debug;

use super::fields::{array, decimal, str_field};
use super::Protocol;
use crate::models::{Position, PositionKind};

pub(super) fn adapt(raw: &Value) -> Vec<Position> {
    let mut positions = Vec::new();

    for item in array(raw, &["positions"]) {
        if !item.is_object() {
            debug!(protocol = "thala", "skipping non-object position");
            continue;
        }

        let pool_id = str_field(item, &["poolId"]);
        let symbols: Vec<&str> = array(item, &["symbols"])
            .iter()
            .filter_map(Value::as_str)
            .collect();
        let label = if symbols.is_empty() {
            pool_id.unwrap_or("?").to_string()
        } else {
            symbols.join("/")
        };

        positions.push(
            Position::new(Protocol::Thala.key(), PositionKind::Liquidity, label.clone())
                .with_value(decimal(item, &["valueUsd"]))
                .with_metadata(json!({ "poolId": pool_id })),
        );

        let mut farm = (Decimal::ZERO, Vec::new());
        let mut fee = (Decimal::ZERO, Vec::new());
        for reward in array(item, &["rewards"]) {
            let amount = decimal(reward, &["amountUsd"]).abs();
            let bucket = match str_field(reward, &["kind"]) {
                Some(kind) if kind.eq_ignore_ascii_case("fee") || kind.eq_ignore_ascii_case("fees") => {
                    &mut fee
                }
                _ => &mut farm,
            };
            bucket.0 = bucket.0.checked_add(amount).unwrap_or(bucket.0);
            if let Some(token) = str_field(reward, &["token"]) {
                bucket.1.push(token.to_string());
            }
        }

        for (source, suffix, (total, tokens)) in [("farm", "farm rewards", farm), ("fee", "fees", fee)] {
            if total.is_zero() {
                continue;
            }
            positions.push(
                Position::new(
                    Protocol::Thala.key(),
                    PositionKind::FarmingReward,
                    format!("{label} {suffix}"),
                )
                .with_value(total)
                .with_metadata(json!({
                    "poolId": pool_id,
                    "source": source,
                    "tokens": tokens,
                })),
            );
        }
    }

    positions
}
