//! Optional field access with numeric fallback.
//!
//! Protocol payloads are treated as partially unknown JSON. Every lookup
//! here tolerates a missing key, a wrong type or a malformed number and
//! returns a default instead: absent amounts read as `"0"`, absent USD
//! figures as zero, absent collections as empty.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::numeric::{decimal_from_json, parse_decimal, raw_amount_string};

/// Walk object keys. Any missing step yields `None`.
pub fn field<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Non-blank string at `path`.
pub fn str_field<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    field(value, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub fn str_or(value: &Value, path: &[&str], default: &str) -> String {
    str_field(value, path).unwrap_or(default).to_string()
}

/// Integer smallest-unit amount at `path` as a string, `"0"` when absent.
pub fn raw_amount(value: &Value, path: &[&str]) -> String {
    raw_amount_string(field(value, path))
}

/// Decimal at `path` (string or number), zero when absent or malformed.
pub fn decimal(value: &Value, path: &[&str]) -> Decimal {
    field(value, path)
        .and_then(decimal_from_json)
        .unwrap_or(Decimal::ZERO)
}

pub fn bool_or(value: &Value, path: &[&str], default: bool) -> bool {
    field(value, path).and_then(Value::as_bool).unwrap_or(default)
}

/// Array at `path`, empty when absent or not an array.
pub fn array<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    field(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Key/value pairs of the object at `path`, empty when absent.
pub fn entries<'a>(value: &'a Value, path: &[&str]) -> Vec<(&'a str, &'a Value)> {
    field(value, path)
        .and_then(Value::as_object)
        .map(|map| map.iter().map(|(k, v)| (k.as_str(), v)).collect())
        .unwrap_or_default()
}

/// Amount given either as an object field or as the value itself.
pub fn amount_or_self(value: &Value, key: &str) -> String {
    if value.is_object() {
        raw_amount(value, &[key])
    } else {
        raw_amount_string(Some(value))
    }
}

pub fn is_zero_amount(raw: &str) -> bool {
    parse_decimal(raw).map_or(true, |d| d.is_zero())
}

/// Sum of a USD figure across an itemized array.
pub fn sum_usd(items: &[Value], key: &str) -> Decimal {
    items
        .iter()
        .map(|item| decimal(item, &[key]).abs())
        .fold(Decimal::ZERO, |acc, v| acc.checked_add(v).unwrap_or(acc))
}

/// Add two raw integer amounts, `"0"` for anything unparseable.
pub fn add_raw(a: &str, b: &str) -> String {
    let a = parse_decimal(a).unwrap_or(Decimal::ZERO);
    let b = parse_decimal(b).unwrap_or(Decimal::ZERO);
    a.checked_add(b)
        .unwrap_or(a)
        .normalize()
        .to_string()
}
