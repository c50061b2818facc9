//! Cache Facade Module
//!
//! Read-through composition of one volatile cache and the shared persistent
//! store for a single external API family:
//! volatile -> persistent (backfilling volatile) -> network (writing both).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{expiry, MetricsReport, PersistentStore, VolatileCache};

// == Cache Facade ==
/// Two-tier cache in front of one external API family.
///
/// Cloning is cheap and clones share both tiers.
///
/// Persistent calls run inline on the calling task while the memory write
/// lock is held. They are short single-row statements; bulk maintenance
/// (sweeps, admin clears) goes through `spawn_blocking` instead.
#[derive(Clone)]
pub struct CacheFacade {
    name: String,
    api_source: String,
    default_ttl: Duration,
    volatile: Arc<RwLock<VolatileCache>>,
    persistent: Arc<dyn PersistentStore>,
}

impl CacheFacade {
    pub fn new(
        volatile: VolatileCache,
        persistent: Arc<dyn PersistentStore>,
        api_source: impl Into<String>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            name: volatile.name().to_string(),
            api_source: api_source.into(),
            default_ttl,
            volatile: Arc::new(RwLock::new(volatile)),
            persistent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn api_source(&self) -> &str {
        &self.api_source
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Shared handle to the in-memory tier, used by the sweep task.
    pub fn volatile(&self) -> Arc<RwLock<VolatileCache>> {
        Arc::clone(&self.volatile)
    }

    // == Get ==
    /// Looks up `key` in memory, then on disk.
    ///
    /// A disk hit is copied back into memory for at most the default TTL and
    /// never beyond the persistent entry's own expiry. The memory write lock
    /// is held across the disk lookup and the backfill, so a concurrent
    /// `set` or `invalidate` on this facade cannot be overwritten by an older
    /// disk value.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut volatile = self.volatile.write().await;

        if let Some(value) = volatile.get(key) {
            debug!(cache = %self.name, key, "Cache HIT (memory)");
            return Some(value);
        }

        let Some(entry) = self.persistent.lookup(key) else {
            debug!(cache = %self.name, key, "Cache MISS");
            return None;
        };
        debug!(cache = %self.name, key, "Cache HIT (disk)");

        let ttl = expiry::remaining(entry.expires_at, expiry::now_ms()).min(self.default_ttl);
        volatile.set(key, entry.value.clone(), ttl);

        Some(entry.value)
    }

    // == Set ==
    /// Writes both tiers under one memory lock. `None` uses the facade's
    /// default TTL.
    pub async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut volatile = self.volatile.write().await;

        self.persistent
            .set(key, &value, ttl, Some(&self.api_source));
        volatile.set(key, value, ttl);
    }

    /// Removes `key` from both tiers under one memory lock.
    pub async fn invalidate(&self, key: &str) {
        let mut volatile = self.volatile.write().await;

        volatile.clear(key);
        self.persistent.delete(key);
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, or runs `fetch` on a miss and
    /// caches its result with the default TTL.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_fetch_with_ttl(key, self.default_ttl, fetch).await
    }

    /// Like [`CacheFacade::get_or_fetch`] with an explicit TTL.
    ///
    /// A fetch error is returned unchanged and nothing is cached. A cached
    /// value that no longer deserializes into `T` counts as a miss.
    pub async fn get_or_fetch_with_ttl<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(key).await {
            match serde_json::from_value::<T>(value) {
                Ok(cached) => return Ok(cached),
                Err(err) => {
                    warn!(cache = %self.name, key, error = %err, "Cached value has unexpected shape, refetching");
                }
            }
        }

        let fetched = fetch().await?;

        match serde_json::to_value(&fetched) {
            Ok(value) => self.set(key, value, Some(ttl)).await,
            Err(err) => {
                warn!(cache = %self.name, key, error = %err, "Response not cacheable");
            }
        }

        Ok(fetched)
    }

    // == Volatile Management ==
    pub async fn clear_volatile(&self) {
        self.volatile.write().await.clear_all();
    }

    pub async fn report(&self) -> MetricsReport {
        self.volatile.read().await.report()
    }

    pub async fn reset_metrics(&self) {
        self.volatile.write().await.reset_metrics();
    }
}
