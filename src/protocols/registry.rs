use std::sync::Arc;

use tracing::warn;

use super::{HttpPositionFetcher, PositionFetcher, Protocol};
use crate::config::ProtocolsConfig;

/// A protocol paired with where its positions come from.
#[derive(Clone)]
pub struct RegisteredProtocol {
    pub protocol: Protocol,
    pub fetcher: Arc<dyn PositionFetcher>,
}

/// The protocols a portfolio is built from, in output order.
#[derive(Clone, Default)]
pub struct ProtocolRegistry {
    entries: Vec<RegisteredProtocol>,
}

impl ProtocolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// HTTP fetchers for every protocol the config leaves enabled.
    pub fn from_config(config: &ProtocolsConfig, client: reqwest::Client) -> Self {
        for key in config.unknown_keys() {
            warn!(protocol = %key, "ignoring config for unknown protocol");
        }

        let mut registry = Self::new();
        for (protocol, url) in config.enabled() {
            registry.register(
                protocol,
                Arc::new(HttpPositionFetcher::new(client.clone(), url)),
            );
        }
        registry
    }

    /// Adds `protocol`, replacing its fetcher if already registered.
    pub fn register(&mut self, protocol: Protocol, fetcher: Arc<dyn PositionFetcher>) {
        match self.entries.iter_mut().find(|e| e.protocol == protocol) {
            Some(existing) => existing.fetcher = fetcher,
            None => self.entries.push(RegisteredProtocol { protocol, fetcher }),
        }
    }

    pub fn with(mut self, protocol: Protocol, fetcher: Arc<dyn PositionFetcher>) -> Self {
        self.register(protocol, fetcher);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredProtocol> {
        self.entries.iter()
    }

    pub fn protocols(&self) -> Vec<Protocol> {
        self.entries.iter().map(|e| e.protocol).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
