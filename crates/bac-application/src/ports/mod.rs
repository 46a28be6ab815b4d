//! Application Ports
//!
//! - `registry` - link-time registry of cluster transports
//! - `services` - service interfaces consumed by the owning domain services

pub mod registry;
pub mod services;

pub use registry::{CacheProviderConfig, CacheProviderEntry, resolve_cache_provider};
pub use services::{
    ChannelSegmentWaveformIdsInterface, FilterDefinitionResolverInterface,
    FilterDefinitionsByUsage, WaveformIdsByChannelSegment,
};
