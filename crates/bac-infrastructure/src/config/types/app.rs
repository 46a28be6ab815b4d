//! Application configuration root

use bac_application::cache::CacheRegistry;
use bac_application::resilience::RetryPolicy;
use bac_domain::error::Result;
use serde::{Deserialize, Serialize};

use super::{CacheConfig, ClusterConfig, LoggingConfig, RetryConfig, standard_cache_configs};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Cluster transport
    pub cluster: ClusterConfig,

    /// Cache descriptors
    pub caches: Vec<CacheConfig>,

    /// Store population retry policy
    pub retry: RetryConfig,

    /// Logging
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            caches: standard_cache_configs(),
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Validated registry of the configured caches
    pub fn registry(&self) -> Result<CacheRegistry> {
        let descriptors = self
            .caches
            .iter()
            .map(CacheConfig::to_descriptor)
            .collect::<Result<Vec<_>>>()?;
        CacheRegistry::register(descriptors)
    }

    /// Retry policy built from the `retry` section
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        self.retry.to_policy()
    }
}
