//! Key-Mapping Caches
//!
//! Typed id-mapping caches between legacy keys and domain keys. A miss is a
//! normal outcome: `get_all` returns only the keys it found and callers treat
//! the shortfall as partial coverage. Within one direction a key maps to one
//! value at a time and the latest write wins.

use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use bac_domain::error::Result;
use bac_domain::value_objects::IdMapping;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;

use super::cluster::CacheHandle;

/// One direction of an id mapping
pub struct KeyMappingCache<K, V> {
    handle: CacheHandle,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Clone for KeyMappingCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            _types: PhantomData,
        }
    }
}

impl<K, V> std::fmt::Debug for KeyMappingCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMappingCache")
            .field("cache", &self.handle.name())
            .finish()
    }
}

impl<K, V> KeyMappingCache<K, V>
where
    K: Serialize + Eq + Hash + Clone + Send + Sync,
    V: Serialize + DeserializeOwned + Send + Sync,
{
    /// Wrap a cache handle
    pub fn new(handle: CacheHandle) -> Self {
        Self {
            handle,
            _types: PhantomData,
        }
    }

    /// Name of the backing cache
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Look up one key
    pub async fn get(&self, key: &K) -> Result<Option<V>> {
        self.handle.get(key).await
    }

    /// Store a mapping, replacing any previous one for the key
    pub async fn put(&self, key: &K, value: &V) -> Result<()> {
        self.handle.put(key, value).await
    }

    /// Look up many keys; missing keys are simply absent from the result
    pub async fn get_all(&self, keys: &[K]) -> Result<HashMap<K, V>> {
        let found = self.handle.get_all(keys).await?;
        trace!(
            cache = self.name(),
            requested = keys.len(),
            found = found.len(),
            "Key mapping lookup"
        );
        Ok(found)
    }

    /// Remove a mapping
    pub async fn remove(&self, key: &K) -> Result<bool> {
        self.handle.remove(key).await
    }
}

/// Both directions of a legacy/domain id mapping
pub struct BidirectionalMapping<L, D> {
    by_legacy: KeyMappingCache<L, D>,
    by_domain: KeyMappingCache<D, L>,
}

impl<L, D> Clone for BidirectionalMapping<L, D> {
    fn clone(&self) -> Self {
        Self {
            by_legacy: self.by_legacy.clone(),
            by_domain: self.by_domain.clone(),
        }
    }
}

impl<L, D> BidirectionalMapping<L, D>
where
    L: Serialize + DeserializeOwned + Eq + Hash + Clone + Send + Sync,
    D: Serialize + DeserializeOwned + Eq + Hash + Clone + Send + Sync,
{
    /// Pair a legacy->domain cache with its domain->legacy counterpart
    pub fn new(by_legacy: CacheHandle, by_domain: CacheHandle) -> Self {
        Self {
            by_legacy: KeyMappingCache::new(by_legacy),
            by_domain: KeyMappingCache::new(by_domain),
        }
    }

    /// Legacy key -> domain key direction
    pub fn by_legacy(&self) -> &KeyMappingCache<L, D> {
        &self.by_legacy
    }

    /// Domain key -> legacy key direction
    pub fn by_domain(&self) -> &KeyMappingCache<D, L> {
        &self.by_domain
    }

    /// Record a mapping in both directions
    pub async fn put(&self, mapping: &IdMapping<L, D>) -> Result<()> {
        self.by_legacy
            .put(&mapping.legacy_key, &mapping.domain_key)
            .await?;
        self.by_domain
            .put(&mapping.domain_key, &mapping.legacy_key)
            .await
    }

    /// Record several mappings in both directions
    pub async fn put_all<'a, I>(&self, mappings: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a IdMapping<L, D>>,
        L: 'a,
        D: 'a,
    {
        for mapping in mappings {
            self.put(mapping).await?;
        }
        Ok(())
    }
}
