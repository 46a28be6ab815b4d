//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the bridged accessor cache
///
/// The error is `Clone` because one population outcome is handed to every
/// caller that joined it, so sources are carried as rendered messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two cache descriptors in one registry share a name
    #[error("Duplicate cache name: {name}")]
    DuplicateCacheName {
        /// The repeated cache name
        name: String,
    },

    /// A cache was requested that the registry does not know about
    #[error("Unknown cache: {name}")]
    UnknownCache {
        /// The requested cache name
        name: String,
    },

    /// Cluster membership is gone or the handle was closed
    #[error("Cache unavailable: {message}")]
    CacheUnavailable {
        /// Description of why the cache cannot be reached
        message: String,
    },

    /// Backing-store work failed after the retry policy gave up
    #[error("Resolution failed for {operation} after {attempts} attempt(s): {message}")]
    ResolutionFailed {
        /// Name of the store operation that failed
        operation: String,
        /// Number of attempts made before giving up
        attempts: u32,
        /// The last error reported by the store
        message: String,
    },

    /// Transient connectivity failure talking to the legacy store
    #[error("Store connectivity error: {message}")]
    StoreConnectivity {
        /// Description of the connectivity failure
        message: String,
    },

    /// Non-transient query failure in the legacy store (malformed query etc.)
    #[error("Store query error: {message}")]
    StoreQuery {
        /// Description of the query failure
        message: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
    },

    /// Cache transport error
    #[error("Cache error: {message}")]
    Cache {
        /// Description of the cache error
        message: String,
    },

    /// Encoding or decoding of a cached value failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization error
        message: String,
    },

    /// Infrastructure-level error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
    },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Registry and cluster errors
impl Error {
    /// Create a duplicate cache name error
    pub fn duplicate_cache_name<S: Into<String>>(name: S) -> Self {
        Self::DuplicateCacheName { name: name.into() }
    }

    /// Create an unknown cache error
    pub fn unknown_cache<S: Into<String>>(name: S) -> Self {
        Self::UnknownCache { name: name.into() }
    }

    /// Create a cache unavailable error
    pub fn cache_unavailable<S: Into<String>>(message: S) -> Self {
        Self::CacheUnavailable {
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }
}

// Backing-store errors
impl Error {
    /// Create a transient store connectivity error
    pub fn store_connectivity<S: Into<String>>(message: S) -> Self {
        Self::StoreConnectivity {
            message: message.into(),
        }
    }

    /// Create a non-transient store query error
    pub fn store_query<S: Into<String>>(message: S) -> Self {
        Self::StoreQuery {
            message: message.into(),
        }
    }

    /// Create a resolution failure for a store operation
    pub fn resolution_failed<O: Into<String>, S: Into<String>>(
        operation: O,
        attempts: u32,
        message: S,
    ) -> Self {
        Self::ResolutionFailed {
            operation: operation.into(),
            attempts,
            message: message.into(),
        }
    }
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl Error {
    /// Whether the population retry policy may retry this error.
    ///
    /// Only store connectivity failures qualify.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreConnectivity { .. })
    }

    /// Whether a caller may retry the whole operation later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CacheUnavailable { .. } | Self::ResolutionFailed { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::internal(s)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::internal(s)
    }
}
