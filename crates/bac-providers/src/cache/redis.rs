//! Redis cluster transport
//!
//! Distributed transport that keeps every cache of the registry in one Redis
//! deployment, suitable for multi-instance deployments where processes must
//! share memoized results.
//!
//! Entries live under `{namespace}:{cache}:{key}`. Expiry is carried by the
//! Redis TTL: writes use `SET PX`, sliding caches read with `GETEX PX` so a
//! read renews the entry. Put-if-absent is `SET NX PX`, which Redis applies
//! atomically across all connected processes.
//!
//! ## Example
//!
//! ```ignore
//! use bac_providers::cache::RedisCacheProvider;
//!
//! let provider = RedisCacheProvider::new("redis://localhost:6379", "bac")?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bac_application::ports::registry::{CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry};
use bac_domain::error::{Error, Result};
use bac_domain::ports::CacheProvider;
use bac_domain::value_objects::{CacheDescriptor, CacheStats, ExpiryPolicy};
use dashmap::DashMap;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::constants::{CACHE_DEFAULT_NAMESPACE, REDIS_SCAN_COUNT};

/// Attempts at put-if-absent when the existing entry expires between the
/// conditional write and the read-back
const SET_IF_ABSENT_ATTEMPTS: usize = 3;

/// Redis-backed cluster transport
///
/// The connection manager is created lazily on first use and reconnects on
/// its own after a dropped connection.
#[derive(Clone)]
pub struct RedisCacheProvider {
    client: Client,
    namespace: String,
    connection: Arc<OnceCell<ConnectionManager>>,
    caches: Arc<DashMap<String, ExpiryPolicy>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl RedisCacheProvider {
    /// Create a transport for a Redis URL with a key namespace
    pub fn new(connection_string: &str, namespace: &str) -> Result<Self> {
        let client = Client::open(connection_string)
            .map_err(|e| Error::configuration(format!("Invalid Redis URL: {e}")))?;

        Ok(Self {
            client,
            namespace: namespace.to_string(),
            connection: Arc::new(OnceCell::new()),
            caches: Arc::new(DashMap::new()),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Create a transport with host and port and the default namespace
    pub fn with_host_port(host: &str, port: u16) -> Result<Self> {
        Self::new(&format!("redis://{host}:{port}"), CACHE_DEFAULT_NAMESPACE)
    }

    /// Key namespace shared by all caches of this transport
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        self.connection
            .get_or_try_init(|| async {
                self.client
                    .get_connection_manager()
                    .await
                    .map_err(|e| map_redis_error("connect", e))
            })
            .await
            .cloned()
    }

    fn expiry(&self, cache: &str) -> Result<ExpiryPolicy> {
        self.caches
            .get(cache)
            .map(|policy| *policy.value())
            .ok_or_else(|| Error::unknown_cache(cache))
    }

    fn entry_key(&self, cache: &str, key: &str) -> String {
        format!("{}:{}:{}", self.namespace, cache, key)
    }

    fn cache_pattern(&self, cache: &str) -> String {
        format!("{}:{}:*", self.namespace, cache)
    }

    fn read_command(&self, expiry: ExpiryPolicy, entry_key: &str) -> redis::Cmd {
        if expiry.reset_on_access {
            let mut cmd = redis::cmd("GETEX");
            cmd.arg(entry_key).arg("PX").arg(ttl_millis(expiry));
            cmd
        } else {
            let mut cmd = redis::cmd("GET");
            cmd.arg(entry_key);
            cmd
        }
    }

    fn record(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    async fn scan_keys(&self, cache: &str) -> Result<Vec<String>> {
        let mut conn = self.connection().await?;
        let pattern = self.cache_pattern(cache);
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(REDIS_SCAN_COUNT)
                .query_async(&mut conn)
                .await
                .map_err(|e| map_redis_error("SCAN", e))?;
            keys.extend(batch);
            if next == 0 {
                return Ok(keys);
            }
            cursor = next;
        }
    }
}

fn ttl_millis(expiry: ExpiryPolicy) -> u64 {
    u64::try_from(expiry.ttl.as_millis())
        .unwrap_or(u64::MAX)
        .max(1)
}

/// Connectivity failures surface as an unavailable cluster, anything else as
/// a failed cache operation.
fn map_redis_error(operation: &str, e: RedisError) -> Error {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
    {
        Error::cache_unavailable(format!("Redis {operation} failed: {e}"))
    } else {
        Error::cache(format!("Redis {operation} failed: {e}"))
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn create_cache(&self, descriptor: &CacheDescriptor) -> Result<()> {
        descriptor.validate()?;
        // Verifies the server is reachable before the cache is handed out.
        self.connection().await?;
        self.caches
            .insert(descriptor.name.clone(), descriptor.expiry);
        debug!(cache = %descriptor, namespace = %self.namespace, "Registered Redis cache");
        Ok(())
    }

    async fn get_json(&self, cache: &str, key: &str) -> Result<Option<String>> {
        let expiry = self.expiry(cache)?;
        let mut conn = self.connection().await?;
        let value: Option<String> = self
            .read_command(expiry, &self.entry_key(cache, key))
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("GET", e))?;
        self.record(value.is_some());
        Ok(value)
    }

    async fn get_many_json(&self, cache: &str, keys: &[String]) -> Result<HashMap<String, String>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let expiry = self.expiry(cache)?;
        let mut conn = self.connection().await?;

        let mut pipe = redis::pipe();
        for key in keys {
            pipe.add_command(self.read_command(expiry, &self.entry_key(cache, key)));
        }
        let values: Vec<Option<String>> = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("pipelined GET", e))?;

        let mut found = HashMap::with_capacity(values.len());
        for (key, value) in keys.iter().zip(values) {
            self.record(value.is_some());
            if let Some(value) = value {
                found.insert(key.clone(), value);
            }
        }
        Ok(found)
    }

    async fn set_json(&self, cache: &str, key: &str, value: &str) -> Result<()> {
        let expiry = self.expiry(cache)?;
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(self.entry_key(cache, key))
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(expiry))
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| map_redis_error("SET", e))
    }

    async fn set_json_if_absent(
        &self,
        cache: &str,
        key: &str,
        value: &str,
    ) -> Result<Option<String>> {
        let expiry = self.expiry(cache)?;
        let entry_key = self.entry_key(cache, key);
        let mut conn = self.connection().await?;

        for _ in 0..SET_IF_ABSENT_ATTEMPTS {
            let stored: Option<String> = redis::cmd("SET")
                .arg(&entry_key)
                .arg(value)
                .arg("NX")
                .arg("PX")
                .arg(ttl_millis(expiry))
                .query_async(&mut conn)
                .await
                .map_err(|e| map_redis_error("SET NX", e))?;
            if stored.is_some() {
                return Ok(None);
            }

            let existing: Option<String> = self
                .read_command(expiry, &entry_key)
                .query_async(&mut conn)
                .await
                .map_err(|e| map_redis_error("GET", e))?;
            if let Some(existing) = existing {
                return Ok(Some(existing));
            }
        }

        Err(Error::cache(format!(
            "Redis put-if-absent on {entry_key} did not settle"
        )))
    }

    async fn delete(&self, cache: &str, key: &str) -> Result<bool> {
        self.expiry(cache)?;
        let mut conn = self.connection().await?;
        let deleted: i64 = redis::cmd("DEL")
            .arg(self.entry_key(cache, key))
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("DEL", e))?;
        Ok(deleted > 0)
    }

    async fn clear(&self, cache: &str) -> Result<()> {
        self.expiry(cache)?;
        let keys = self.scan_keys(cache).await?;
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        for chunk in keys.chunks(REDIS_SCAN_COUNT) {
            redis::cmd("DEL")
                .arg(chunk)
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| map_redis_error("DEL", e))?;
        }
        debug!(cache, removed = keys.len(), "Cleared Redis cache");
        Ok(())
    }

    async fn size(&self, cache: &str) -> Result<usize> {
        self.expiry(cache)?;
        Ok(self.scan_keys(cache).await?.len())
    }

    async fn stats(&self) -> Result<CacheStats> {
        let names: Vec<String> = self.caches.iter().map(|c| c.key().clone()).collect();
        let mut entries = 0u64;
        for name in names {
            entries += self.scan_keys(&name).await?.len() as u64;
        }
        Ok(CacheStats::from_counters(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            entries,
        ))
    }

    async fn shutdown(&self) -> Result<()> {
        // Entries stay in Redis for the other members of the cluster.
        self.caches.clear();
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("namespace", &self.namespace)
            .field("caches", &self.caches.len())
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

fn redis_cache_factory(
    config: &CacheProviderConfig,
) -> std::result::Result<Arc<dyn CacheProvider>, String> {
    let uri = config
        .uri
        .as_deref()
        .ok_or_else(|| "Redis transport requires a uri".to_string())?;
    let namespace = config
        .namespace
        .as_deref()
        .unwrap_or(CACHE_DEFAULT_NAMESPACE);

    let provider = RedisCacheProvider::new(uri, namespace)
        .map_err(|e| format!("Failed to create Redis provider: {e}"))?;

    Ok(Arc::new(provider))
}

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static REDIS_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: "redis",
    description: "Redis distributed transport",
    factory: redis_cache_factory,
};
