//! External Provider Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | CacheProvider | Cluster transport backing the named caches |

/// Cache provider port
pub mod cache;

pub use cache::CacheProvider;
