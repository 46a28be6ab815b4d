//! Cluster Transport Implementations
//!
//! ## Available Providers
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`MokaCacheProvider`] | Local | In-memory, one process |
//! | [`RedisCacheProvider`] | Distributed | Redis-backed for multi-instance |
//!
//! ## Provider Selection Guide
//!
//! - **Development/Testing**: Use `MokaCacheProvider`
//! - **Multi Instance**: Use `RedisCacheProvider` so memoized results and id
//!   mappings are shared between processes

#[cfg(feature = "cache-moka")]
pub mod moka;
#[cfg(feature = "cache-redis")]
pub mod redis;

#[cfg(feature = "cache-moka")]
pub use moka::MokaCacheProvider;
#[cfg(feature = "cache-redis")]
pub use redis::RedisCacheProvider;

// Re-export domain types used by transports
pub use bac_domain::value_objects::{CacheDescriptor, CacheStats, ExpiryPolicy};
