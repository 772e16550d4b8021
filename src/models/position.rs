use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What kind of exposure a position represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionKind {
    Supply,
    Borrow,
    Liquidity,
    Staking,
    FarmingReward,
}

impl PositionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PositionKind::Supply => "supply",
            PositionKind::Borrow => "borrow",
            PositionKind::Liquidity => "liquidity",
            PositionKind::Staking => "staking",
            PositionKind::FarmingReward => "farming_reward",
        }
    }

    /// Debt is the only kind subtracted when totalling a protocol.
    pub fn is_debt(self) -> bool {
        matches!(self, PositionKind::Borrow)
    }

    /// +1 for assets, -1 for debt.
    pub fn sign(self) -> Decimal {
        if self.is_debt() {
            Decimal::NEGATIVE_ONE
        } else {
            Decimal::ONE
        }
    }
}

/// One unit of exposure to a protocol.
///
/// `value_usd` is always a non-negative magnitude; the sign is applied only
/// when a [`super::ProtocolPortfolio`] is totalled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub protocol_key: String,
    pub kind: PositionKind,
    pub symbol_label: String,
    pub raw_amount: String,
    pub decimals: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub value_usd: Decimal,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Position {
    pub fn new(protocol_key: impl Into<String>, kind: PositionKind, symbol_label: impl Into<String>) -> Self {
        Self {
            protocol_key: protocol_key.into(),
            kind,
            symbol_label: symbol_label.into(),
            raw_amount: "0".to_string(),
            decimals: 0,
            value_usd: Decimal::ZERO,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_amount(mut self, raw_amount: impl Into<String>, decimals: u32) -> Self {
        self.raw_amount = raw_amount.into();
        self.decimals = decimals;
        self
    }

    /// Stores the magnitude of `value`.
    pub fn with_value(mut self, value: Decimal) -> Self {
        self.value_usd = value.abs();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Contribution to the protocol total (negative for debt).
    pub fn signed_value(&self) -> Decimal {
        self.kind.sign() * self.value_usd
    }
}
