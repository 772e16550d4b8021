//! Aries Markets: profiles keyed by name, each with deposit and borrow maps.
//!
//! The upstream endpoint may return profiles that belong to other accounts.
//! Only profiles whose `owner` is the queried address are counted.

use serde_json::{json, Value};
use tracing::debug;

use super::fields::{amount_or_self, entries, is_zero_amount, str_field};
use super::{AdaptContext, Protocol};
use crate::models::{equals, AssetId, Position, PositionKind};

const SIDES: [(PositionKind, &str, &str); 2] = [
    (PositionKind::Supply, "deposits", "collateral_amount"),
    (PositionKind::Borrow, "borrows", "borrowed_share"),
];

pub(super) fn assets(raw: &Value) -> Vec<AssetId> {
    entries(raw, &["profiles"])
        .into_iter()
        .flat_map(|(_, profile)| {
            SIDES
                .iter()
                .flat_map(move |(_, side, _)| entries(profile, &[*side]))
        })
        .map(|(coin, _)| AssetId::parse(coin))
        .collect()
}

pub(super) fn adapt(raw: &Value, ctx: &AdaptContext<'_>) -> Vec<Position> {
    let mut positions = Vec::new();

    for (name, profile) in entries(raw, &["profiles"]) {
        let owner = str_field(profile, &["owner"]).unwrap_or_default();
        if !equals(owner, ctx.address) {
            debug!(protocol = "aries", profile = %name, "skipping profile owned by another account");
            continue;
        }

        for (kind, side, amount_key) in SIDES {
            for (coin, entry) in entries(profile, &[side]) {
                let amount = amount_or_self(entry, amount_key);
                if is_zero_amount(&amount) {
                    continue;
                }
                positions.push(ctx.asset_position(
                    Protocol::Aries,
                    kind,
                    coin,
                    &amount,
                    json!({ "profile": name }),
                ));
            }
        }
    }

    positions
}
