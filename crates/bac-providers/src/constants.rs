//! Provider Constants
//!
//! Constants specific to transport implementations. Domain constants live
//! in bac-domain.

// ============================================================================
// CACHE PROVIDER CONSTANTS
// ============================================================================

/// Default maximum number of entries per local cache
pub const CACHE_DEFAULT_MAX_CAPACITY: u64 = 1_000_000;

/// Default key namespace for distributed caches
pub const CACHE_DEFAULT_NAMESPACE: &str = "bac";

/// Keys requested per SCAN round trip
pub const REDIS_SCAN_COUNT: usize = 500;
