//! Decimal parsing and unit scaling shared by balances, prices and adapters.
//!
//! Upstream numbers arrive as strings, JSON numbers or not at all. Every
//! helper here is total: malformed input becomes zero (or `None` where the
//! caller must tell "absent" from "zero"), never a panic and never NaN.

use std::str::FromStr;

use rust_decimal::{Decimal, MathematicalOps};
use serde_json::Value;

/// Decimals assumed for Aptos assets we know nothing about.
pub const DEFAULT_DECIMALS: u32 = 8;

/// Parse a decimal string, accepting scientific notation. Blank -> `None`.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Interpret a JSON string or number as a decimal.
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    }
}

/// `raw / 10^decimals`. Unparseable or unrepresentable amounts scale to zero.
pub fn scale_amount(raw: &str, decimals: u32) -> Decimal {
    let Some(value) = parse_decimal(raw) else {
        return Decimal::ZERO;
    };

    let mut scaled = value;
    if scaled.set_scale(value.scale() + decimals).is_ok() {
        return scaled;
    }

    Decimal::TEN
        .checked_powu(u64::from(decimals))
        .and_then(|divisor| value.checked_div(divisor))
        .unwrap_or(Decimal::ZERO)
}

/// `amount * price`, zero on overflow.
pub fn usd_value(amount: Decimal, price: Decimal) -> Decimal {
    amount.checked_mul(price).unwrap_or(Decimal::ZERO)
}

/// Sum of `values`, `None` if any partial sum overflows.
pub fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// Normalize an integer amount to a plain decimal string. Missing or
/// malformed input becomes `"0"`.
///
/// Integer digit strings are kept verbatim (sign and leading zeros dropped)
/// so amounts wider than a `Decimal` survive. Only fractional or scientific
/// input goes through `Decimal`.
pub fn raw_amount_string(value: Option<&Value>) -> String {
    let text = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return "0".to_string(),
    };
    if let Some(digits) = integer_digits(&text) {
        return digits;
    }
    parse_decimal(&text)
        .map(|d| d.trunc().abs().normalize().to_string())
        .unwrap_or_else(|| "0".to_string())
}

fn integer_digits(text: &str) -> Option<String> {
    let unsigned = text
        .strip_prefix(|c: char| c == '-' || c == '+')
        .unwrap_or(text);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let trimmed = unsigned.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
}
