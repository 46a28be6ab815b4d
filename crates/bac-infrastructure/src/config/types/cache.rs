//! Cache descriptor configuration types

use std::time::Duration;

use bac_application::cache::standard_catalog;
use bac_domain::constants::{DEFAULT_CACHE_TTL_SECS, MAX_CACHE_TTL_SECS};
use bac_domain::error::{Error, Result};
use bac_domain::value_objects::{
    CacheDescriptor, ConsistencyMode, ExpiryPolicy, ReplicationMode,
};
use serde::{Deserialize, Serialize};

/// One configured cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Unique cache name
    pub name: String,

    /// Distribution mode
    pub replication: ReplicationMode,

    /// Write isolation mode
    pub consistency: ConsistencyMode,

    /// Entry expiry in seconds
    pub ttl_secs: u64,

    /// Whether reads renew the expiry
    pub reset_on_access: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            replication: ReplicationMode::default(),
            consistency: ConsistencyMode::default(),
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            reset_on_access: true,
        }
    }
}

impl CacheConfig {
    /// Descriptor for this cache
    ///
    /// # Errors
    ///
    /// A configuration error for an empty name, a zero TTL or a TTL above
    /// [`MAX_CACHE_TTL_SECS`].
    pub fn to_descriptor(&self) -> Result<CacheDescriptor> {
        if self.ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(Error::configuration(format!(
                "Cache '{}' TTL of {}s exceeds the maximum of {}s",
                self.name, self.ttl_secs, MAX_CACHE_TTL_SECS
            )));
        }
        let ttl = Duration::from_secs(self.ttl_secs);
        let expiry = if self.reset_on_access {
            ExpiryPolicy::sliding(ttl)
        } else {
            ExpiryPolicy::fixed(ttl)
        };
        let descriptor = CacheDescriptor::new(&self.name)
            .with_replication(self.replication)
            .with_consistency(self.consistency)
            .with_expiry(expiry);
        descriptor.validate()?;
        Ok(descriptor)
    }
}

impl From<&CacheDescriptor> for CacheConfig {
    fn from(descriptor: &CacheDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            replication: descriptor.replication,
            consistency: descriptor.consistency,
            ttl_secs: descriptor.expiry.ttl.as_secs(),
            reset_on_access: descriptor.expiry.reset_on_access,
        }
    }
}

/// Configuration entries for the standard catalog
pub fn standard_cache_configs() -> Vec<CacheConfig> {
    standard_catalog().iter().map(CacheConfig::from).collect()
}
