//! # Bridged Accessor Cache
//!
//! Resolves domain entities into values held by a legacy relational store,
//! through named caches shared by every process of a deployment.
//!
//! This crate provides the public API and re-exports the layer crates.
//!
//! ## Features
//!
//! - **Cache registry**: named caches with replication, consistency and
//!   sliding or fixed expiry
//! - **Key-mapping caches**: bidirectional legacy/domain id mappings
//! - **Request memoization**: whole results memoized by request fingerprint,
//!   one population per fingerprint
//! - **Partial results**: missing legacy data is reported, never fatal
//! - **Retry policy**: bounded exponential backoff on transient store failures
//!
//! ## Example
//!
//! ```ignore
//! use bac::infrastructure::{ConfigLoader, init_app};
//!
//! let context = init_app(ConfigLoader::new().load()?).await?;
//! let resolver = context.filter_definition_resolver(stores)?;
//! let result = resolver.resolve(&hypotheses).await?;
//! if result.is_partial() {
//!     // some hypotheses have no filter definitions in the legacy store
//! }
//! ```
//!
//! ## Architecture
//!
//! - `domain` - errors, value objects and port traits
//! - `application` - cache layer, retry policy and bridging resolvers
//! - `infrastructure` - configuration, logging and bootstrap
//! - `providers` - cluster transports (moka, redis)

/// Domain layer - errors, value objects and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use bac_domain::*;
}

/// Application layer - caches, retry policy and resolvers
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use bac_application::*;
}

/// Infrastructure layer - configuration, logging and bootstrap
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use bac_infrastructure::*;
}

/// Cluster transports
pub mod providers {
    pub use bac_providers::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export main entry points at the crate root
pub use application::{
    BridgingResolver, CacheClusterManager, CacheRegistry, ChannelSegmentWaveformIds,
    FilterDefinitionStores, RetryPolicy,
};
pub use infrastructure::{AppConfig, AppContext, ConfigLoader, init_app};
