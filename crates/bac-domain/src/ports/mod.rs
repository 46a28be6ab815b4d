//! Domain Port Interfaces
//!
//! - **providers/** - cluster transport backing the named caches
//! - **store** - batched lookups against the legacy schema

/// External service provider ports
pub mod providers;
/// Legacy store port
pub mod store;

pub use providers::CacheProvider;
pub use store::{LegacyStore, StoreBatch};
