//! Domain layer constants
//!
//! Values that are part of the caching and bridging contract. Infrastructure
//! defaults (config file names, log settings) live in
//! `bac-infrastructure/src/constants.rs`.

use std::time::Duration;

// ============================================================================
// CACHE EXPIRY CONSTANTS
// ============================================================================

/// Default time-to-live of a cache entry (30 days)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Default time-to-live of a cache entry as a `Duration`
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(DEFAULT_CACHE_TTL_SECS);

/// Longest accepted time-to-live of a cache entry (100 years)
pub const MAX_CACHE_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Longest accepted time-to-live as a `Duration`
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(MAX_CACHE_TTL_SECS);

// ============================================================================
// BACKING STORE CONSTANTS
// ============================================================================

/// Maximum number of keys sent to the legacy store in one query
pub const MAX_KEYS_PER_QUERY: usize = 1000;

// ============================================================================
// STANDARD CACHE NAMES
// ============================================================================

/// Hypothesis id -> account-scoped arrival id
pub const HYPOTHESIS_ARRIVAL_IDS_CACHE: &str = "hypothesis-arrival-ids";

/// Account-scoped arrival id -> hypothesis id
pub const ARRIVAL_HYPOTHESIS_IDS_CACHE: &str = "arrival-hypothesis-ids";

/// Legacy filter id -> filter definition
pub const FILTER_DEFINITIONS_CACHE: &str = "filter-definitions";

/// Memoized filter-definitions-by-usage resolutions
pub const FILTER_DEFINITIONS_BY_USAGE_REQUESTS_CACHE: &str =
    "filter-definitions-by-usage-requests";

/// Channel segment descriptor -> legacy waveform ids
pub const CHANNEL_SEGMENT_WAVEFORM_IDS_CACHE: &str = "channel-segment-waveform-ids";

// ============================================================================
// LEGACY PARAMETER GROUP NAMES
// ============================================================================

/// Group name of detection filter parameters
pub const GROUP_NAME_DETECTION: &str = "DETECT";

/// Group name of FK filter parameters
pub const GROUP_NAME_FK: &str = "FK";

/// Group name of onset filter parameters
pub const GROUP_NAME_ONSET: &str = "ONSET";

/// Group name of amplitude measurement filter parameters
pub const GROUP_NAME_AMPLITUDE: &str = "MEASURE";
