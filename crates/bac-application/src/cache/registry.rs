//! Cache Descriptor Registry
//!
//! The authoritative list of caches a cluster provisions. A registry is an
//! explicit value handed to cluster initialization, so several independent
//! registries can live in one process.

use std::collections::HashMap;

use bac_domain::constants::{
    ARRIVAL_HYPOTHESIS_IDS_CACHE, CHANNEL_SEGMENT_WAVEFORM_IDS_CACHE,
    FILTER_DEFINITIONS_BY_USAGE_REQUESTS_CACHE, FILTER_DEFINITIONS_CACHE,
    HYPOTHESIS_ARRIVAL_IDS_CACHE,
};
use bac_domain::error::{Error, Result};
use bac_domain::value_objects::{CacheDescriptor, ReplicationMode};

/// Validated set of cache descriptors with unique names
#[derive(Debug, Clone, Default)]
pub struct CacheRegistry {
    descriptors: Vec<CacheDescriptor>,
    index: HashMap<String, usize>,
}

impl CacheRegistry {
    /// Validate and register a set of descriptors
    ///
    /// # Errors
    ///
    /// `DuplicateCacheName` if two descriptors share a name, a configuration
    /// error if a descriptor has an empty name or an out-of-range TTL.
    pub fn register<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = CacheDescriptor>,
    {
        let mut registry = Self::default();
        for descriptor in descriptors {
            descriptor.validate()?;
            if registry.index.contains_key(&descriptor.name) {
                return Err(Error::duplicate_cache_name(descriptor.name));
            }
            registry
                .index
                .insert(descriptor.name.clone(), registry.descriptors.len());
            registry.descriptors.push(descriptor);
        }
        Ok(registry)
    }

    /// Registry holding the standard catalog
    pub fn standard() -> Self {
        // Catalog names are distinct constants.
        let descriptors = standard_catalog();
        let index = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        Self { descriptors, index }
    }

    /// Look up a descriptor by name
    pub fn get(&self, name: &str) -> Option<&CacheDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    /// Look up a descriptor, failing with `UnknownCache`
    pub fn descriptor(&self, name: &str) -> Result<&CacheDescriptor> {
        self.get(name).ok_or_else(|| Error::unknown_cache(name))
    }

    /// Whether a cache of this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> &[CacheDescriptor] {
        &self.descriptors
    }

    /// Registered cache names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    /// Number of registered caches
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether no caches are registered
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Descriptors of every cache the bridging services use
pub fn standard_catalog() -> Vec<CacheDescriptor> {
    vec![
        CacheDescriptor::new(HYPOTHESIS_ARRIVAL_IDS_CACHE),
        CacheDescriptor::new(ARRIVAL_HYPOTHESIS_IDS_CACHE),
        CacheDescriptor::new(FILTER_DEFINITIONS_CACHE),
        CacheDescriptor::new(FILTER_DEFINITIONS_BY_USAGE_REQUESTS_CACHE),
        CacheDescriptor::new(CHANNEL_SEGMENT_WAVEFORM_IDS_CACHE)
            .with_replication(ReplicationMode::Replicated),
    ]
}
