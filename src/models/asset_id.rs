use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid Aptos address {value:?}: expected 0x followed by 1 to 64 hex digits")]
pub struct AddressError {
    value: String,
}

/// Canonical form of an asset identifier.
///
/// Fungible-asset addresses are lower-cased, stripped of `0x` and leading
/// zeros, then re-prefixed (`0x000A` -> `0xa`, all zeros -> `0x0`). Legacy
/// coin paths (`0xADDR::module::Type`) get the same treatment for the address
/// segment and are lower-cased as a whole. Move type names are case-sensitive
/// on chain, so lower-casing them relaxes equality; two coins differing only
/// in case would compare equal here.
///
/// Empty input stays empty and never matches anything (see [`equals`]).
pub fn canonicalize(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    match raw.split_once("::") {
        Some((address, rest)) => {
            format!("{}::{}", canonical_hex(address), rest.to_lowercase())
        }
        None => canonical_hex(raw),
    }
}

/// Whether two identifiers denote the same asset.
pub fn equals(a: &str, b: &str) -> bool {
    let a = canonicalize(a);
    !a.is_empty() && a == canonicalize(b)
}

/// Validate an account address given by a caller (`0x` + 1..=64 hex digits).
pub fn validate_account_address(raw: &str) -> Result<String, AddressError> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"^0[xX][0-9a-fA-F]{1,64}$").ok());

    let trimmed = raw.trim();
    match pattern {
        Some(re) if re.is_match(trimmed) => Ok(canonicalize(trimmed)),
        _ => Err(AddressError {
            value: raw.to_string(),
        }),
    }
}

/// Zero-padded 64-digit form of an account address, as the indexer stores
/// owner addresses. Input that is not plain hex is returned canonicalized.
pub fn long_form(raw: &str) -> String {
    let canonical = canonicalize(raw);
    match canonical.strip_prefix("0x") {
        Some(digits) if !canonical.contains("::") && digits.len() <= 64 => {
            format!("0x{digits:0>64}")
        }
        _ => canonical,
    }
}

fn canonical_hex(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let digits = lower.strip_prefix("0x").unwrap_or(&lower);
    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{stripped}")
    }
}

/// Canonicalized asset identifier. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn parse(raw: &str) -> Self {
        Self(canonicalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }

    /// True for legacy `0xADDR::module::Type` coin paths.
    pub fn is_coin_path(&self) -> bool {
        self.0.contains("::")
    }

    /// Display fallback: the segment after the last `::`, or the whole id.
    pub fn short_name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for AssetId {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
