//! Cache Transport Registry
//!
//! Transports register themselves in [`CACHE_PROVIDERS`] and are looked up
//! by name when the cluster is initialized.

use std::collections::HashMap;
use std::sync::Arc;

use bac_domain::error::{Error, Result};
use bac_domain::ports::CacheProvider;

/// Configuration for transport creation
///
/// Contains every option a transport might need. Providers use what they
/// need and ignore the rest.
#[derive(Debug, Clone, Default)]
pub struct CacheProviderConfig {
    /// Provider name (e.g., "moka", "redis")
    pub provider: String,
    /// Connection URI (for distributed transports)
    pub uri: Option<String>,
    /// Maximum number of entries per cache (local transports)
    pub max_capacity: Option<u64>,
    /// Namespace prefix for keys
    pub namespace: Option<String>,
    /// Additional provider-specific configuration
    pub extra: HashMap<String, String>,
}

impl CacheProviderConfig {
    /// Create a new config with the given provider name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Set the URI
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the max capacity
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add extra configuration
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Registry entry for cluster transports
pub struct CacheProviderEntry {
    /// Unique provider name (e.g., "moka", "redis")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create a provider instance
    pub factory: fn(&CacheProviderConfig) -> std::result::Result<Arc<dyn CacheProvider>, String>,
}

#[linkme::distributed_slice]
pub static CACHE_PROVIDERS: [CacheProviderEntry] = [..];

/// Resolve a transport by name and create it
///
/// # Errors
///
/// A configuration error naming the available providers when the name is
/// not registered, or the factory's own error.
pub fn resolve_cache_provider(config: &CacheProviderConfig) -> Result<Arc<dyn CacheProvider>> {
    let provider_name = &config.provider;

    if let Some(entry) = CACHE_PROVIDERS.iter().find(|e| e.name == provider_name) {
        return (entry.factory)(config).map_err(|message| {
            Error::configuration(format!(
                "Failed to create cache provider '{provider_name}': {message}"
            ))
        });
    }

    let available: Vec<&str> = CACHE_PROVIDERS.iter().map(|e| e.name).collect();
    Err(Error::configuration(format!(
        "Unknown cache provider '{provider_name}'. Available providers: {available:?}"
    )))
}

/// List all registered transports as (name, description) pairs
pub fn list_cache_providers() -> Vec<(&'static str, &'static str)> {
    CACHE_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
