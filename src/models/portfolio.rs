use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::warn;

use super::{Position, TokenLineItem};
use crate::numeric::checked_sum;

/// All positions one protocol holds for the queried address.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolPortfolio {
    pub protocol_key: String,
    pub positions: Vec<Position>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value_usd: Decimal,
}

impl ProtocolPortfolio {
    /// Totals `positions`, subtracting debt. This is the only place a sign is applied.
    ///
    /// A total that does not fit a `Decimal` degrades to the empty entry.
    pub fn from_positions(protocol_key: impl Into<String>, positions: Vec<Position>) -> Self {
        let protocol_key = protocol_key.into();
        match checked_sum(positions.iter().map(Position::signed_value)) {
            Some(total_value_usd) => Self {
                protocol_key,
                positions,
                total_value_usd,
            },
            None => {
                warn!(protocol = %protocol_key, positions = positions.len(), "protocol total overflowed; reporting empty");
                Self {
                    protocol_key,
                    positions: Vec::new(),
                    total_value_usd: Decimal::ZERO,
                }
            }
        }
    }

    /// The degraded entry for a protocol whose fetch or adapter failed.
    pub fn empty(protocol_key: impl Into<String>) -> Self {
        Self::from_positions(protocol_key, Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub wallet_value_usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub protocols_value_usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value_usd: Decimal,
}

impl PortfolioTotals {
    /// Roll-up of wallet and protocol values. Any sum that overflows is
    /// reported as zero with a warning rather than aborting the request.
    pub fn compute(tokens: &[TokenLineItem], protocols: &[ProtocolPortfolio]) -> Self {
        let wallet_value_usd = checked_sum(tokens.iter().map(TokenLineItem::value_or_zero))
            .unwrap_or_else(|| overflowed("wallet"));
        let protocols_value_usd = checked_sum(protocols.iter().map(|p| p.total_value_usd))
            .unwrap_or_else(|| overflowed("protocols"));
        let total_value_usd = wallet_value_usd
            .checked_add(protocols_value_usd)
            .unwrap_or_else(|| overflowed("total"));
        Self {
            wallet_value_usd,
            protocols_value_usd,
            total_value_usd,
        }
    }
}

fn overflowed(total: &str) -> Decimal {
    warn!(total, "portfolio total overflowed; reporting zero");
    Decimal::ZERO
}

/// The composed response for one wallet. Built fresh per request.
///
/// `protocols` keeps registration order and serializes as a JSON object
/// keyed by protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub address: String,
    pub tokens: Vec<TokenLineItem>,
    #[serde(serialize_with = "serialize_protocols")]
    pub protocols: Vec<ProtocolPortfolio>,
    pub totals: PortfolioTotals,
    pub date_time: DateTime<Utc>,
}

impl Portfolio {
    pub fn new(
        address: impl Into<String>,
        tokens: Vec<TokenLineItem>,
        protocols: Vec<ProtocolPortfolio>,
        date_time: DateTime<Utc>,
    ) -> Self {
        let totals = PortfolioTotals::compute(&tokens, &protocols);
        Self {
            address: address.into(),
            tokens,
            protocols,
            totals,
            date_time,
        }
    }

    pub fn protocol(&self, key: &str) -> Option<&ProtocolPortfolio> {
        self.protocols.iter().find(|p| p.protocol_key == key)
    }

    pub fn wallet_value_usd(&self) -> Decimal {
        self.totals.wallet_value_usd
    }

    pub fn protocols_value_usd(&self) -> Decimal {
        self.totals.protocols_value_usd
    }

    pub fn total_value_usd(&self) -> Decimal {
        self.totals.total_value_usd
    }
}

fn serialize_protocols<S>(protocols: &[ProtocolPortfolio], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(protocols.len()))?;
    for protocol in protocols {
        map.serialize_entry(&protocol.protocol_key, protocol)?;
    }
    map.end()
}
