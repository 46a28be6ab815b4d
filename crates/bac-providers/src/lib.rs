//! # Bridged Accessor Cache - Transport Implementations
//!
//! Implementations of the cluster transport port defined in `bac-domain`.
//! Each transport registers itself in the `bac-application` registry and is
//! selected by name from configuration.
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | `moka` | Local | Single-node in-memory transport |
//! | `redis` | Distributed | Shared by every process of a deployment |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! bac-providers = { version = "0.1", default-features = false, features = ["cache-redis"] }
//! ```

pub use bac_domain::error::{Error, Result};
pub use bac_domain::ports::CacheProvider;

/// Provider-specific constants
pub mod constants;

/// Cluster transport implementations
pub mod cache;
