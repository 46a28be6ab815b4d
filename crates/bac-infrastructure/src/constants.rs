//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Domain-specific constants are defined in `bac_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "bac.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "bac";

/// Environment variable prefix for configuration (`BAC__RETRY__MAX_ATTEMPTS`)
pub const CONFIG_ENV_PREFIX: &str = "BAC";

/// Separator between prefix and nested keys in environment variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// CLUSTER CONSTANTS
// ============================================================================

/// Default cluster transport
pub const DEFAULT_CLUSTER_PROVIDER: &str = "moka";

/// Transports that need a connection URI
pub const DISTRIBUTED_CLUSTER_PROVIDERS: &[&str] = &["redis"];

// ============================================================================
// RETRY CONSTANTS
// ============================================================================

/// Default delay before the first retry, in the default unit
pub const DEFAULT_RETRY_INITIAL_DELAY: u64 = 50;

/// Default cap on the retry delay, in the default unit
pub const DEFAULT_RETRY_MAX_DELAY: u64 = 1000;

/// Default number of attempts per store call
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 5;

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "BAC_LOG";

/// File stem used when the configured log path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "bac";
