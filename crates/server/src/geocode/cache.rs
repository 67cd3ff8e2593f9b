//! Cache for geocode payloads.
//!
//! The queue only talks to the [`GeocodeCache`] trait, so expiry and size
//! bounds are a property of the cache and never of the scheduling logic.
//! [`MokaGeocodeCache`] keeps entries for the process lifetime unless a TTL or
//! size bound is configured.

use std::future::Future;

use moka::future::Cache;
use serde_json::Value;

use super::GeocodeKey;
use crate::config::GeocodeConfig;

/// Key-value store of resolved payloads.
pub trait GeocodeCache: Send + Sync + 'static {
    /// Look up a previously stored payload.
    fn get(&self, key: &GeocodeKey) -> impl Future<Output = Option<Value>> + Send;

    /// Store a payload, replacing any previous one.
    fn insert(&self, key: GeocodeKey, value: Value) -> impl Future<Output = ()> + Send;
}

/// [`GeocodeCache`] backed by `moka`.
#[derive(Clone)]
pub struct MokaGeocodeCache {
    cache: Cache<GeocodeKey, Value>,
}

impl MokaGeocodeCache {
    /// Build a cache from configuration.
    #[must_use]
    pub fn new(config: &GeocodeConfig) -> Self {
        let mut builder = Cache::builder();
        if let Some(max) = config.cache_max_entries {
            builder = builder.max_capacity(max);
        }
        if let Some(ttl) = config.cache_ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            cache: builder.build(),
        }
    }

    /// An unbounded cache whose entries never expire.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            cache: Cache::builder().build(),
        }
    }

    /// Approximate number of cached payloads.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl std::fmt::Debug for MokaGeocodeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaGeocodeCache")
            .field("entry_count", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl GeocodeCache for MokaGeocodeCache {
    async fn get(&self, key: &GeocodeKey) -> Option<Value> {
        self.cache.get(key).await
    }

    async fn insert(&self, key: GeocodeKey, value: Value) {
        self.cache.insert(key, value).await;
    }
}
