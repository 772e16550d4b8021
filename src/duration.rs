//! Human-readable durations for config values like `ttl = "60s"`.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{de, Deserialize, Deserializer};

/// Parse a duration such as `"60s"`, `"2m"`, `"1h"` or `"500ms"`.
///
/// Input is trimmed and case-insensitive. A bare number is rejected so a
/// config value always states its unit.
///
/// ```
/// use aptfolio::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("60s").unwrap(), Duration::from_secs(60));
/// assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
/// assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .context("Duration must end with a unit (ms, s, m, h)")?;
    let (num, unit) = s.split_at(split);
    if num.is_empty() {
        anyhow::bail!("Duration is missing a number: {s:?}");
    }
    let num: u64 = num.parse().context("Invalid number in duration")?;

    let millis = match unit {
        "ms" => Some(num),
        "s" => num.checked_mul(1_000),
        "m" => num.checked_mul(60 * 1_000),
        "h" => num.checked_mul(60 * 60 * 1_000),
        other => anyhow::bail!("Unknown duration unit {other:?} (expected ms, s, m or h)"),
    }
    .context("Duration is too large")?;

    Ok(Duration::from_millis(millis))
}

/// Serde adapter: `#[serde(deserialize_with = "deserialize_duration")]`.
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration(" 10M ").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn rejects_missing_unit_or_number() {
        assert!(parse_duration("60").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("5d").is_err());
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_duration("18446744073709551615h").is_err());
    }
}
