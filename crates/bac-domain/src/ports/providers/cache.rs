//! Cache Provider Port
//!
//! The cluster transport behind every named cache. Implementations provide
//! string-keyed JSON storage with per-cache expiry and an atomic
//! put-if-absent, which is what the memoization layer relies on for
//! cross-process convergence.
//!
//! Caches must be created from their [`CacheDescriptor`] before use; the
//! descriptor fixes the expiry policy of every entry written to it.

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::{CacheDescriptor, CacheStats};

/// Cache Provider Port
///
/// # Implementations
///
/// - **Moka**: single-node in-memory transport
/// - **Redis**: distributed transport shared by every process
#[async_trait]
pub trait CacheProvider: Send + Sync + Debug {
    /// Provision a named cache; creating an existing cache is a no-op
    async fn create_cache(&self, descriptor: &CacheDescriptor) -> Result<()>;

    /// Read one entry, renewing its expiry if the cache slides on access
    async fn get_json(&self, cache: &str, key: &str) -> Result<Option<String>>;

    /// Read several entries; only found keys appear in the result
    async fn get_many_json(&self, cache: &str, keys: &[String]) -> Result<HashMap<String, String>> {
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.get_json(cache, key).await? {
                found.insert(key.clone(), value);
            }
        }
        Ok(found)
    }

    /// Write an entry, replacing any previous value
    async fn set_json(&self, cache: &str, key: &str, value: &str) -> Result<()>;

    /// Write an entry only if the key is absent.
    ///
    /// Returns `None` when this call stored the value, or the value that was
    /// already present.
    async fn set_json_if_absent(&self, cache: &str, key: &str, value: &str)
    -> Result<Option<String>>;

    /// Remove an entry, reporting whether it existed
    async fn delete(&self, cache: &str, key: &str) -> Result<bool>;

    /// Remove every entry of a cache
    async fn clear(&self, cache: &str) -> Result<()>;

    /// Number of live entries in a cache
    async fn size(&self, cache: &str) -> Result<usize>;

    /// Transport-wide statistics
    async fn stats(&self) -> Result<CacheStats>;

    /// Release connections and local state
    async fn shutdown(&self) -> Result<()>;

    /// Provider name (e.g. "moka", "redis")
    fn provider_name(&self) -> &str;
}
