//! Cache Cluster Manager
//!
//! Joins a cache cluster through a registered transport, provisions every
//! cache in the registry, and hands out [`CacheHandle`]s. A manager keeps at
//! most one active membership: initializing it again while a cluster is
//! active returns the existing handle.
//!
//! The transport is the only networked piece. Tests substitute the
//! single-node in-memory transport through
//! [`CacheClusterManager::initialize_with_provider`].

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bac_domain::error::{Error, Result};
use bac_domain::ports::CacheProvider;
use bac_domain::value_objects::{CacheDescriptor, CacheStats};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::registry::CacheRegistry;
use crate::ports::registry::{CacheProviderConfig, resolve_cache_provider};

/// Owns the process's cluster membership
#[derive(Default)]
pub struct CacheClusterManager {
    active: Mutex<Option<ClusterHandle>>,
}

impl CacheClusterManager {
    /// Create a manager with no active membership
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the cluster through the configured transport.
    ///
    /// Returns the existing handle if this manager already holds an active
    /// membership.
    pub async fn initialize(
        &self,
        config: &CacheProviderConfig,
        registry: CacheRegistry,
    ) -> Result<ClusterHandle> {
        let mut active = self.active.lock().await;
        if let Some(handle) = active.as_ref().filter(|h| h.is_active()) {
            debug!(provider = handle.provider_name(), "Cluster already active");
            return Ok(handle.clone());
        }

        let provider = resolve_cache_provider(config)?;
        let handle = ClusterHandle::join(provider, registry).await?;
        *active = Some(handle.clone());
        Ok(handle)
    }

    /// Join the cluster through an already-built transport
    pub async fn initialize_with_provider(
        &self,
        provider: Arc<dyn CacheProvider>,
        registry: CacheRegistry,
    ) -> Result<ClusterHandle> {
        let mut active = self.active.lock().await;
        if let Some(handle) = active.as_ref().filter(|h| h.is_active()) {
            debug!(provider = handle.provider_name(), "Cluster already active");
            return Ok(handle.clone());
        }

        let handle = ClusterHandle::join(provider, registry).await?;
        *active = Some(handle.clone());
        Ok(handle)
    }

    /// The active membership, if any
    pub async fn current(&self) -> Option<ClusterHandle> {
        self.active
            .lock()
            .await
            .as_ref()
            .filter(|h| h.is_active())
            .cloned()
    }

    /// Leave the cluster; every handle obtained from it stops working
    pub async fn shutdown(&self) -> Result<()> {
        let handle = self.active.lock().await.take();
        match handle {
            Some(handle) => handle.shutdown().await,
            None => Ok(()),
        }
    }
}

struct ClusterState {
    provider: Arc<dyn CacheProvider>,
    registry: CacheRegistry,
    active: AtomicBool,
}

impl ClusterState {
    fn ensure_active(&self, cache: &str) -> Result<()> {
        if self.active.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(Error::cache_unavailable(format!(
                "cluster membership closed; cache '{cache}' is no longer reachable"
            )))
        }
    }
}

/// Live cluster membership
#[derive(Clone)]
pub struct ClusterHandle {
    state: Arc<ClusterState>,
}

impl ClusterHandle {
    async fn join(provider: Arc<dyn CacheProvider>, registry: CacheRegistry) -> Result<Self> {
        for descriptor in registry.descriptors() {
            provider.create_cache(descriptor).await?;
            debug!(cache = %descriptor, "Cache provisioned");
        }
        info!(
            provider = provider.provider_name(),
            caches = registry.len(),
            "Joined cache cluster"
        );
        Ok(Self {
            state: Arc::new(ClusterState {
                provider,
                registry,
                active: AtomicBool::new(true),
            }),
        })
    }

    /// Handle to a registered cache
    ///
    /// # Errors
    ///
    /// `UnknownCache` if the registry has no such cache, `CacheUnavailable`
    /// after shutdown.
    pub fn get_cache(&self, name: &str) -> Result<CacheHandle> {
        let descriptor = self.state.registry.descriptor(name)?.clone();
        self.state.ensure_active(name)?;
        Ok(CacheHandle {
            descriptor: Arc::new(descriptor),
            state: Arc::clone(&self.state),
        })
    }

    /// The registry this cluster was built from
    pub fn registry(&self) -> &CacheRegistry {
        &self.state.registry
    }

    /// Name of the underlying transport
    pub fn provider_name(&self) -> &str {
        self.state.provider.provider_name()
    }

    /// Whether the membership is still active
    pub fn is_active(&self) -> bool {
        self.state.active.load(Ordering::Acquire)
    }

    /// Transport statistics
    pub async fn stats(&self) -> Result<CacheStats> {
        self.state.ensure_active("*")?;
        self.state.provider.stats().await
    }

    /// Release the membership. Later calls are no-ops.
    pub async fn shutdown(&self) -> Result<()> {
        if self.state.active.swap(false, Ordering::AcqRel) {
            info!(provider = self.provider_name(), "Leaving cache cluster");
            self.state.provider.shutdown().await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClusterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterHandle")
            .field("provider", &self.provider_name())
            .field("caches", &self.state.registry.len())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Handle to one named cache
///
/// Typed operations encode keys and values as JSON. Every operation fails
/// with `CacheUnavailable` once the owning cluster has shut down.
#[derive(Clone)]
pub struct CacheHandle {
    descriptor: Arc<CacheDescriptor>,
    state: Arc<ClusterState>,
}

impl CacheHandle {
    /// Cache name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Cache descriptor
    pub fn descriptor(&self) -> &CacheDescriptor {
        &self.descriptor
    }

    fn provider(&self) -> Result<&dyn CacheProvider> {
        self.state.ensure_active(self.name())?;
        Ok(self.state.provider.as_ref())
    }

    /// Read a raw JSON entry
    pub async fn get_json(&self, key: &str) -> Result<Option<String>> {
        self.provider()?.get_json(self.name(), key).await
    }

    /// Write a raw JSON entry
    pub async fn set_json(&self, key: &str, value: &str) -> Result<()> {
        self.provider()?.set_json(self.name(), key, value).await
    }

    /// Write a raw JSON entry if absent; returns the existing value otherwise
    pub async fn set_json_if_absent(&self, key: &str, value: &str) -> Result<Option<String>> {
        self.provider()?
            .set_json_if_absent(self.name(), key, value)
            .await
    }

    /// Read a typed entry
    pub async fn get<K, V>(&self, key: &K) -> Result<Option<V>>
    where
        K: Serialize + ?Sized,
        V: DeserializeOwned,
    {
        let key = encode_key(key)?;
        match self.get_json(&key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Read several typed entries; only found keys are returned
    pub async fn get_all<K, V>(&self, keys: &[K]) -> Result<HashMap<K, V>>
    where
        K: Serialize + Eq + Hash + Clone,
        V: DeserializeOwned,
    {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let mut by_encoded = HashMap::with_capacity(keys.len());
        for key in keys {
            by_encoded.insert(encode_key(key)?, key);
        }
        let encoded: Vec<String> = by_encoded.keys().cloned().collect();
        let found = self
            .provider()?
            .get_many_json(self.name(), &encoded)
            .await?;

        let mut values = HashMap::with_capacity(found.len());
        for (encoded_key, json) in found {
            if let Some(key) = by_encoded.get(&encoded_key) {
                values.insert((*key).clone(), serde_json::from_str(&json)?);
            }
        }
        Ok(values)
    }

    /// Write a typed entry, replacing any previous value
    pub async fn put<K, V>(&self, key: &K, value: &V) -> Result<()>
    where
        K: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        let key = encode_key(key)?;
        let json = serde_json::to_string(value)?;
        self.set_json(&key, &json).await
    }

    /// Write a typed entry unless one exists; returns the existing value
    pub async fn put_if_absent<K, V>(&self, key: &K, value: &V) -> Result<Option<V>>
    where
        K: Serialize + ?Sized,
        V: Serialize + DeserializeOwned,
    {
        let key = encode_key(key)?;
        let json = serde_json::to_string(value)?;
        match self.set_json_if_absent(&key, &json).await? {
            Some(existing) => Ok(Some(serde_json::from_str(&existing)?)),
            None => Ok(None),
        }
    }

    /// Remove a typed entry
    pub async fn remove<K: Serialize + ?Sized>(&self, key: &K) -> Result<bool> {
        let key = encode_key(key)?;
        self.provider()?.delete(self.name(), &key).await
    }

    /// Remove every entry
    pub async fn clear(&self) -> Result<()> {
        self.provider()?.clear(self.name()).await
    }

    /// Number of live entries
    pub async fn size(&self) -> Result<usize> {
        self.provider()?.size(self.name()).await
    }
}

impl std::fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheHandle")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

fn encode_key<K: Serialize + ?Sized>(key: &K) -> Result<String> {
    Ok(serde_json::to_string(key)?)
}
