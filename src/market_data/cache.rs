use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::PriceMap;
use crate::clock::{Clock, SystemClock};
use crate::models::AssetId;

/// Default lifetime of a cached price batch.
pub const DEFAULT_PRICE_TTL: Duration = Duration::from_secs(60);

struct CachedBatch {
    inserted_at: DateTime<Utc>,
    prices: PriceMap,
}

/// Short-lived cache of price batches.
///
/// Entries are keyed by the batch signature (sorted canonical ids), never by
/// single asset: a batch is either served whole or fetched again whole.
/// Expiry is measured from insertion.
pub struct PriceCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: tokio::sync::Mutex<HashMap<String, CachedBatch>>,
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            clock: Arc::new(SystemClock),
            entries: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signature of a request batch: sorted, de-duplicated canonical ids.
    pub fn batch_key(ids: &[AssetId]) -> String {
        let mut ids: Vec<&str> = ids
            .iter()
            .map(AssetId::as_str)
            .filter(|id| !id.is_empty())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.join(",")
    }

    /// Fresh entry for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<PriceMap> {
        let now = self.clock.now();
        let entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        if self.is_fresh(entry, now) {
            Some(entry.prices.clone())
        } else {
            debug!(key = %key, "cached price batch expired");
            None
        }
    }

    /// Store a batch, overwriting any previous one with the same key.
    pub async fn insert(&self, key: String, prices: PriceMap) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| self.is_fresh(entry, now));
        entries.insert(
            key,
            CachedBatch {
                inserted_at: now,
                prices,
            },
        );
    }

    /// Drop expired batches. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    fn is_fresh(&self, entry: &CachedBatch, now: DateTime<Utc>) -> bool {
        let age = (now - entry.inserted_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        age < self.ttl
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_TTL)
    }
}
