use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::duration::deserialize_duration;
use crate::protocols::Protocol;

/// Environment variable that overrides `prices.api_key`.
pub const PRICE_API_KEY_ENV: &str = "APTFOLIO_PRICE_API_KEY";

/// Placeholder substituted with the queried address in protocol URLs.
pub const ADDRESS_PLACEHOLDER: &str = "{address}";

/// Balance indexer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// GraphQL endpoint.
    pub url: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            url: "https://api.mainnet.aptoslabs.com/v1/graphql".to_string(),
        }
    }
}

fn default_price_ttl() -> Duration {
    crate::market_data::DEFAULT_PRICE_TTL
}

/// Price source configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricesConfig {
    pub url: String,

    /// Sent as `x-api-key`. Prefer setting it through the environment.
    pub api_key: Option<String>,

    /// How long a batch of prices is reused.
    #[serde(default = "default_price_ttl", deserialize_with = "deserialize_duration")]
    pub ttl: Duration,
}

impl fmt::Debug for PricesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PricesConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            url: "https://api.panora.exchange".to_string(),
            api_key: None,
            ttl: default_price_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FullnodeConfig {
    pub url: String,
}

impl Default for FullnodeConfig {
    fn default() -> Self {
        Self {
            url: "https://fullnode.mainnet.aptoslabs.com".to_string(),
        }
    }
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(15)
}

/// Outbound HTTP settings shared by every client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout. A protocol that exceeds it is reported empty.
    #[serde(default = "default_http_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_http_timeout(),
        }
    }
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_max_attempts() -> u32 {
    10
}

/// Transaction confirmation polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionsConfig {
    #[serde(default = "default_poll_interval", deserialize_with = "deserialize_duration")]
    pub interval: Duration,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for TransactionsConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Per-protocol overrides under `[protocols.<key>]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub enabled: bool,

    /// Full URL template containing `{address}`. Replaces the default
    /// endpoint derived from `protocols.base_url`.
    pub url: Option<String>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: None,
        }
    }
}

/// Protocol position endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolsConfig {
    /// Each protocol is fetched from
    /// `{base_url}/{key}/positions?address={address}` unless overridden.
    pub base_url: String,

    #[serde(flatten)]
    pub overrides: BTreeMap<String, ProtocolConfig>,
}

impl Default for ProtocolsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api/protocols".to_string(),
            overrides: BTreeMap::new(),
        }
    }
}

impl ProtocolsConfig {
    /// URL template for `protocol`, or `None` when it is disabled.
    pub fn endpoint(&self, protocol: Protocol) -> Option<String> {
        let overrides = self.override_for(protocol);
        if overrides.is_some_and(|o| !o.enabled) {
            return None;
        }
        match overrides.and_then(|o| o.url.clone()) {
            Some(url) => Some(url),
            None => Some(format!(
                "{}/{}/positions?address={ADDRESS_PLACEHOLDER}",
                self.base_url.trim_end_matches('/'),
                protocol.key()
            )),
        }
    }

    /// The `[protocols.<key>]` section for `protocol`. Keys match the way
    /// [`Protocol::from_key`] does; an exact key wins over a differently
    /// cased one.
    fn override_for(&self, protocol: Protocol) -> Option<&ProtocolConfig> {
        self.overrides.get(protocol.key()).or_else(|| {
            self.overrides
                .iter()
                .find(|(key, _)| Protocol::from_key(key) == Some(protocol))
                .map(|(_, section)| section)
        })
    }

    /// Enabled protocols with their URL templates, in registration order.
    pub fn enabled(&self) -> Vec<(Protocol, String)> {
        Protocol::ALL
            .into_iter()
            .filter_map(|p| self.endpoint(p).map(|url| (p, url)))
            .collect()
    }

    /// Override sections that do not name a known protocol.
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.overrides
            .keys()
            .map(String::as_str)
            .filter(|key| Protocol::from_key(key).is_none())
            .collect()
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(default)]
    pub indexer: IndexerConfig,

    #[serde(default)]
    pub prices: PricesConfig,

    #[serde(default)]
    pub fullnode: FullnodeConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub transactions: TransactionsConfig,

    #[serde(default)]
    pub protocols: ProtocolsConfig,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// [`Config::load_or_default`] followed by environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        Ok(Self::load_or_default(path)?.with_price_api_key(std::env::var(PRICE_API_KEY_ENV).ok()))
    }

    /// Replace the price API key when `key` is present and non-blank.
    pub fn with_price_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.prices.api_key = Some(key);
        }
        self
    }

    /// Copy safe to print: secrets are masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.prices.api_key.is_some() {
            copy.prices.api_key = Some("********".to_string());
        }
        copy
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./aptfolio.toml` if it exists in current directory
/// 2. `<config dir>/aptfolio/aptfolio.toml` (e.g. `~/.config` on Linux)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("aptfolio.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("aptfolio").join("aptfolio.toml");
    }

    local_config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, lines: &[&str]) -> Result<PathBuf> {
        let config_path = dir.path().join("aptfolio.toml");
        let mut file = std::fs::File::create(&config_path)?;
        for line in lines {
            writeln!(file, "{line}")?;
        }
        Ok(config_path)
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.prices.ttl, Duration::from_secs(60));
        assert_eq!(config.transactions.interval, Duration::from_secs(2));
        assert_eq!(config.transactions.max_attempts, 10);
        assert!(config.prices.api_key.is_none());
        assert_eq!(config.protocols.enabled().len(), Protocol::ALL.len());
    }

    #[test]
    fn test_load_empty_config() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = write_config(&dir, &[])?;

        let config = Config::load(&config_path)?;
        assert_eq!(config.indexer.url, IndexerConfig::default().url);

        Ok(())
    }

    #[test]
    fn test_load_durations_and_urls() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = write_config(
            &dir,
            &[
                "[prices]",
                "url = \"http://localhost:9000\"",
                "ttl = \"5m\"",
                "[http]",
                "timeout = \"500ms\"",
                "[transactions]",
                "interval = \"1s\"",
                "max_attempts = 3",
            ],
        )?;

        let config = Config::load(&config_path)?;
        assert_eq!(config.prices.url, "http://localhost:9000");
        assert_eq!(config.prices.ttl, Duration::from_secs(300));
        assert_eq!(config.http.timeout, Duration::from_millis(500));
        assert_eq!(config.transactions.interval, Duration::from_secs(1));
        assert_eq!(config.transactions.max_attempts, 3);

        Ok(())
    }

    #[test]
    fn test_protocol_overrides() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = write_config(
            &dir,
            &[
                "[protocols]",
                "base_url = \"http://gateway/api/\"",
                "[protocols.meso]",
                "enabled = false",
                "[protocols.aries]",
                "url = \"http://aries/{address}\"",
                "[protocols.nonsense]",
                "enabled = true",
            ],
        )?;

        let config = Config::load(&config_path)?;
        let protocols = &config.protocols;
        assert_eq!(protocols.endpoint(Protocol::Meso), None);
        assert_eq!(
            protocols.endpoint(Protocol::Aries).as_deref(),
            Some("http://aries/{address}")
        );
        assert_eq!(
            protocols.endpoint(Protocol::Echelon).as_deref(),
            Some("http://gateway/api/echelon/positions?address={address}")
        );
        assert_eq!(protocols.unknown_keys(), vec!["nonsense"]);

        let enabled: Vec<&str> = protocols.enabled().iter().map(|(p, _)| p.key()).collect();
        assert_eq!(
            enabled,
            vec!["echelon", "joule", "aries", "hyperion", "thala", "amnis", "kofi"]
        );

        Ok(())
    }

    #[test]
    fn test_protocol_override_keys_ignore_case() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = write_config(
            &dir,
            &[
                "[protocols.Echelon]",
                "enabled = false",
                "[protocols.KOFI]",
                "url = \"http://kofi/{address}\"",
            ],
        )?;

        let config = Config::load(&config_path)?;
        let protocols = &config.protocols;
        assert_eq!(protocols.endpoint(Protocol::Echelon), None);
        assert_eq!(
            protocols.endpoint(Protocol::Kofi).as_deref(),
            Some("http://kofi/{address}")
        );
        assert!(protocols.unknown_keys().is_empty());

        Ok(())
    }

    #[test]
    fn test_debug_hides_api_key() {
        let mut config = Config::default();
        config.prices.api_key = Some("super-secret".to_string());

        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn test_rejects_bad_duration() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = write_config(&dir, &["[prices]", "ttl = \"soon\""])?;
        assert!(Config::load(&config_path).is_err());
        Ok(())
    }

    #[test]
    fn test_env_key_overrides_file_key() {
        let mut config = Config::default();
        config.prices.api_key = Some("from-file".to_string());

        let config = config.with_price_api_key(Some("from-env".to_string()));
        assert_eq!(config.prices.api_key.as_deref(), Some("from-env"));

        let config = config.with_price_api_key(Some("  ".to_string()));
        assert_eq!(config.prices.api_key.as_deref(), Some("from-env"));

        assert_eq!(config.redacted().prices.api_key.as_deref(), Some("********"));
    }

    #[test]
    fn test_load_or_default_missing_file() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("missing.toml");

        let config = Config::load_or_default(&config_path)?;
        assert_eq!(config.fullnode.url, FullnodeConfig::default().url);

        Ok(())
    }
}
