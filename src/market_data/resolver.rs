use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{PriceCache, PriceMap, PriceSource};
use crate::models::AssetId;

/// Batched, cached USD price lookups that never fail.
///
/// Callers should put every asset they need for one portfolio build into a
/// single [`PriceResolver::get_prices`] call; the cache only serves exact
/// batch repeats.
pub struct PriceResolver {
    source: Arc<dyn PriceSource>,
    cache: Arc<PriceCache>,
}

impl PriceResolver {
    pub fn new(source: Arc<dyn PriceSource>, cache: Arc<PriceCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &Arc<PriceCache> {
        &self.cache
    }

    /// Prices for `asset_ids`. An upstream failure yields an empty map;
    /// absent entries mean "price unknown".
    pub async fn get_prices(&self, asset_ids: &[AssetId]) -> PriceMap {
        let mut ids: Vec<AssetId> = asset_ids
            .iter()
            .filter(|id| !id.is_unknown())
            .cloned()
            .collect();
        ids.sort();
        ids.dedup();

        if ids.is_empty() {
            return PriceMap::default();
        }

        let key = PriceCache::batch_key(&ids);
        if let Some(cached) = self.cache.get(&key).await {
            debug!(assets = ids.len(), "price batch served from cache");
            return cached;
        }

        match self.source.fetch_prices(&ids).await {
            Ok(prices) => {
                let map = PriceMap::from_prices(prices);
                info!(
                    source = %self.source.name(),
                    requested = ids.len(),
                    resolved = map.len(),
                    "price batch fetched"
                );
                self.cache.insert(key, map.clone()).await;
                map
            }
            Err(e) => {
                warn!(
                    source = %self.source.name(),
                    requested = ids.len(),
                    error = %e,
                    "price fetch failed; continuing without prices"
                );
                PriceMap::default()
            }
        }
    }
}
