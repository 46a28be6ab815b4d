//! Cluster transport configuration types

use bac_application::ports::registry::CacheProviderConfig;
use bac_providers::constants::CACHE_DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CLUSTER_PROVIDER;

/// Cluster transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Registered transport name (`moka`, `redis`)
    pub provider: String,

    /// Connection URI for distributed transports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Namespace prefixed to every key
    pub namespace: String,

    /// Maximum entries per cache (local transports)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<u64>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_CLUSTER_PROVIDER.to_string(),
            uri: None,
            namespace: CACHE_DEFAULT_NAMESPACE.to_string(),
            max_capacity: None,
        }
    }
}

impl ClusterConfig {
    /// Registry lookup configuration for this transport
    pub fn to_provider_config(&self) -> CacheProviderConfig {
        let mut config =
            CacheProviderConfig::new(&self.provider).with_namespace(&self.namespace);
        if let Some(uri) = &self.uri {
            config = config.with_uri(uri);
        }
        if let Some(max_capacity) = self.max_capacity {
            config = config.with_max_capacity(max_capacity);
        }
        config
    }
}
