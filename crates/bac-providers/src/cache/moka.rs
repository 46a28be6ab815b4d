//! Moka in-memory cluster transport
//!
//! Single-node transport holding one `moka::future::Cache` per descriptor.
//! It stands in for a real cluster in development and tests.
//!
//! - sliding expiry maps to moka's time-to-idle, fixed expiry to time-to-live
//! - put-if-absent goes through moka's entry API, which is atomic per key
//! - replication and consistency modes are accepted but have no effect on a
//!   single node
//!
//! ## Example
//!
//! ```ignore
//! use bac_providers::cache::MokaCacheProvider;
//!
//! let provider = MokaCacheProvider::with_capacity(10_000);
//! provider.create_cache(&CacheDescriptor::new("filter-definitions")).await?;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bac_application::ports::registry::{CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry};
use bac_domain::error::{Error, Result};
use bac_domain::ports::CacheProvider;
use bac_domain::value_objects::{CacheDescriptor, CacheStats};
use dashmap::DashMap;
use moka::future::Cache;
use tracing::debug;

use crate::constants::CACHE_DEFAULT_MAX_CAPACITY;

/// Moka-based single-node transport
#[derive(Clone)]
pub struct MokaCacheProvider {
    caches: Arc<DashMap<String, Cache<String, String>>>,
    max_capacity: u64,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for MokaCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MokaCacheProvider {
    /// Create a transport with the default per-cache capacity
    pub fn new() -> Self {
        Self::with_capacity(CACHE_DEFAULT_MAX_CAPACITY)
    }

    /// Create a transport with the given per-cache capacity
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            caches: Arc::new(DashMap::new()),
            max_capacity,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Maximum number of entries per cache
    pub fn max_capacity(&self) -> u64 {
        self.max_capacity
    }

    fn cache(&self, name: &str) -> Result<Cache<String, String>> {
        self.caches
            .get(name)
            .map(|cache| cache.value().clone())
            .ok_or_else(|| Error::unknown_cache(name))
    }

    fn record(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[async_trait]
impl CacheProvider for MokaCacheProvider {
    async fn create_cache(&self, descriptor: &CacheDescriptor) -> Result<()> {
        descriptor.validate()?;
        self.caches
            .entry(descriptor.name.clone())
            .or_insert_with(|| {
                let builder = Cache::builder()
                    .name(&descriptor.name)
                    .max_capacity(self.max_capacity);
                let builder = if descriptor.expiry.reset_on_access {
                    builder.time_to_idle(descriptor.expiry.ttl)
                } else {
                    builder.time_to_live(descriptor.expiry.ttl)
                };
                debug!(cache = %descriptor, "Created moka cache");
                builder.build()
            });
        Ok(())
    }

    async fn get_json(&self, cache: &str, key: &str) -> Result<Option<String>> {
        let value = self.cache(cache)?.get(key).await;
        self.record(value.is_some());
        Ok(value)
    }

    async fn set_json(&self, cache: &str, key: &str, value: &str) -> Result<()> {
        self.cache(cache)?
            .insert(key.to_string(), value.to_string())
            .await;
        Ok(())
    }

    async fn set_json_if_absent(
        &self,
        cache: &str,
        key: &str,
        value: &str,
    ) -> Result<Option<String>> {
        let entry = self
            .cache(cache)?
            .entry(key.to_string())
            .or_insert(value.to_string())
            .await;
        if entry.is_fresh() {
            Ok(None)
        } else {
            Ok(Some(entry.into_value()))
        }
    }

    async fn delete(&self, cache: &str, key: &str) -> Result<bool> {
        Ok(self.cache(cache)?.remove(key).await.is_some())
    }

    async fn clear(&self, cache: &str) -> Result<()> {
        let cache = self.cache(cache)?;
        cache.invalidate_all();
        cache.run_pending_tasks().await;
        Ok(())
    }

    async fn size(&self, cache: &str) -> Result<usize> {
        let cache = self.cache(cache)?;
        // Run pending tasks to ensure entry_count is accurate
        cache.run_pending_tasks().await;
        Ok(usize::try_from(cache.entry_count()).unwrap_or(usize::MAX))
    }

    async fn stats(&self) -> Result<CacheStats> {
        let caches: Vec<Cache<String, String>> =
            self.caches.iter().map(|c| c.value().clone()).collect();
        let mut entries = 0;
        for cache in caches {
            cache.run_pending_tasks().await;
            entries += cache.entry_count();
        }
        Ok(CacheStats::from_counters(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            entries,
        ))
    }

    async fn shutdown(&self) -> Result<()> {
        for cache in self.caches.iter() {
            cache.value().invalidate_all();
        }
        self.caches.clear();
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "moka"
    }
}

impl std::fmt::Debug for MokaCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheProvider")
            .field("max_capacity", &self.max_capacity)
            .field("caches", &self.caches.len())
            .finish()
    }
}

// ============================================================================
// Auto-registration via linkme
// ============================================================================

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static MOKA_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: "moka",
    description: "Moka single-node in-memory transport",
    factory: |config: &CacheProviderConfig| {
        let provider = match config.max_capacity {
            Some(max_capacity) => MokaCacheProvider::with_capacity(max_capacity),
            None => MokaCacheProvider::new(),
        };
        Ok(Arc::new(provider))
    },
};
