// src/portfolio/isolate.rs
use std::panic::{catch_unwind, AssertUnwindSafe};

use anyhow::Result;
use serde_json::Value;
use tracing::warn;

use crate::models::{Position, ProtocolPortfolio};

/// Contain one protocol's failure.
///
/// A fetch error or a panic while adapting or totalling yields an empty
/// portfolio with a zero total for `protocol_key`; nothing propagates to the
/// caller.
pub fn isolate<F>(protocol_key: &str, fetched: Result<Value>, adapt: F) -> ProtocolPortfolio
where
    F: FnOnce(&Value) -> Vec<Position>,
{
    let raw = match fetched {
        Ok(raw) => raw,
        Err(e) => {
            warn!(protocol = %protocol_key, error = %format!("{e:#}"), "protocol fetch failed; reporting empty");
            return ProtocolPortfolio::empty(protocol_key);
        }
    };

    match catch_unwind(AssertUnwindSafe(|| {
        ProtocolPortfolio::from_positions(protocol_key, adapt(&raw))
    })) {
        Ok(portfolio) => portfolio,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(protocol = %protocol_key, error = %message, "protocol adapter panicked; reporting empty");
            ProtocolPortfolio::empty(protocol_key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PositionKind;
    use anyhow::anyhow;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn fetch_error_degrades_to_empty() {
        let result = isolate("meso", Err(anyhow!("503")), |_| {
            panic!("adapter must not run after a failed fetch")
        });
        assert!(result.positions.is_empty());
        assert_eq!(result.total_value_usd, Decimal::ZERO);
        assert_eq!(result.protocol_key, "meso");
    }

    #[test]
    fn adapter_panic_degrades_to_empty() {
        let result = isolate("joule", Ok(json!({})), |_| panic!("boom"));
        assert!(result.positions.is_empty());
        assert_eq!(result.total_value_usd, Decimal::ZERO);
    }

    #[test]
    fn success_is_totalled_with_sign() {
        let result = isolate("echelon", Ok(json!({})), |_| {
            vec![
                Position::new("echelon", PositionKind::Supply, "APT").with_value(Decimal::from(100)),
                Position::new("echelon", PositionKind::Borrow, "USDC").with_value(Decimal::from(30)),
            ]
        });
        assert_eq!(result.total_value_usd, Decimal::from(70));
        assert_eq!(result.positions.len(), 2);
    }

    #[test]
    fn total_overflow_degrades_to_empty() {
        let huge = Decimal::MAX;
        let result = isolate("hyperion", Ok(json!({})), |_| {
            vec![
                Position::new("hyperion", PositionKind::Liquidity, "APT/USDC").with_value(huge),
                Position::new("hyperion", PositionKind::Liquidity, "APT/USDT").with_value(huge),
            ]
        });
        assert!(result.positions.is_empty());
        assert_eq!(result.total_value_usd, Decimal::ZERO);
    }
}
