//! Expiry Sweep Tasks
//!
//! Background tasks that periodically drop expired entries from both tiers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheRegistry, PersistentStore, VolatileCache};
use crate::config::Config;

/// Spawns the in-memory sweep over every given cache.
///
/// Runs until aborted, sleeping `interval` between passes.
pub fn spawn_volatile_sweep(
    caches: Vec<Arc<RwLock<VolatileCache>>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_s = interval.as_secs(), "Starting in-memory cache sweep");

        loop {
            tokio::time::sleep(interval).await;

            for cache in &caches {
                let mut guard = cache.write().await;
                let removed = guard.cleanup();
                if removed > 0 {
                    info!(cache = %guard.name(), removed, "Swept expired in-memory entries");
                } else {
                    debug!(cache = %guard.name(), "In-memory sweep found nothing expired");
                }
            }
        }
    })
}

/// Spawns the persistent sweep.
///
/// SQLite calls block, so each pass runs on the blocking pool.
pub fn spawn_persistent_sweep(
    store: Arc<dyn PersistentStore>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_s = interval.as_secs(), "Starting persistent cache sweep");

        loop {
            tokio::time::sleep(interval).await;

            let store = Arc::clone(&store);
            match tokio::task::spawn_blocking(move || store.cleanup()).await {
                Ok(removed) => debug!(removed, "Persistent sweep finished"),
                Err(err) => warn!(error = %err, "Persistent sweep task failed"),
            }
        }
    })
}

/// Handles of the running sweeps.
#[derive(Debug)]
pub struct BackgroundTasks {
    volatile: JoinHandle<()>,
    persistent: JoinHandle<()>,
}

impl BackgroundTasks {
    /// Starts both sweeps for every cache in the registry.
    pub fn spawn(registry: &CacheRegistry, config: &Config) -> Self {
        Self {
            volatile: spawn_volatile_sweep(registry.volatile_caches(), config.volatile_sweep_interval),
            persistent: spawn_persistent_sweep(
                Arc::clone(registry.persistent()),
                config.persistent_sweep_interval,
            ),
        }
    }

    /// Stops both sweeps.
    pub fn shutdown(&self) {
        self.volatile.abort();
        self.persistent.abort();
        info!("Cache sweeps stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.volatile.is_finished() && self.persistent.is_finished()
    }
}
