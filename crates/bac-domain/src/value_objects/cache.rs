//! Cache descriptor value objects
//!
//! A [`CacheDescriptor`] names one cache in the cluster together with how it
//! is distributed and how its entries expire. Descriptors are immutable and
//! built once at startup.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CACHE_TTL, MAX_CACHE_TTL};
use crate::error::{Error, Result};

/// How entries of a cache are spread across cluster members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicationMode {
    /// Each entry lives on one primary member
    #[default]
    Partitioned,
    /// Every member holds a full copy
    Replicated,
}

/// Write isolation offered by a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyMode {
    /// Single-key atomic operations
    #[default]
    Atomic,
    /// Multi-key transactional operations
    Transactional,
}

/// Entry expiry policy
///
/// With `reset_on_access` the expiry clock restarts whenever the entry is
/// read (sliding window); otherwise it runs from the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpiryPolicy {
    /// Time an entry survives without renewal
    pub ttl: Duration,
    /// Whether reads renew the expiry clock
    pub reset_on_access: bool,
}

impl ExpiryPolicy {
    /// Sliding expiry renewed on every access
    pub fn sliding(ttl: Duration) -> Self {
        Self {
            ttl,
            reset_on_access: true,
        }
    }

    /// Fixed expiry measured from the write
    pub fn fixed(ttl: Duration) -> Self {
        Self {
            ttl,
            reset_on_access: false,
        }
    }

    /// Check the TTL is non-zero and within [`MAX_CACHE_TTL`]
    ///
    /// # Errors
    ///
    /// A configuration error naming the offending bound.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(Error::configuration("TTL cannot be 0"));
        }
        if self.ttl > MAX_CACHE_TTL {
            return Err(Error::configuration(format!(
                "TTL of {}s exceeds the maximum of {}s",
                self.ttl.as_secs(),
                MAX_CACHE_TTL.as_secs()
            )));
        }
        Ok(())
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::sliding(DEFAULT_CACHE_TTL)
    }
}

/// A named cache definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheDescriptor {
    /// Unique cache name within a registry
    pub name: String,
    /// Distribution mode
    pub replication: ReplicationMode,
    /// Write isolation mode
    pub consistency: ConsistencyMode,
    /// Entry expiry
    pub expiry: ExpiryPolicy,
}

impl CacheDescriptor {
    /// Partitioned, atomic cache with the default 30-day sliding expiry
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replication: ReplicationMode::default(),
            consistency: ConsistencyMode::default(),
            expiry: ExpiryPolicy::default(),
        }
    }

    /// Set the replication mode
    pub fn with_replication(mut self, replication: ReplicationMode) -> Self {
        self.replication = replication;
        self
    }

    /// Set the consistency mode
    pub fn with_consistency(mut self, consistency: ConsistencyMode) -> Self {
        self.consistency = consistency;
        self
    }

    /// Set the expiry policy
    pub fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }

    /// Check the name is non-empty and the expiry is within bounds
    ///
    /// # Errors
    ///
    /// A configuration error mentioning the cache name.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::configuration("Cache name cannot be empty"));
        }
        match self.expiry.validate() {
            Err(Error::Configuration { message }) => Err(Error::configuration(format!(
                "Cache '{}': {message}",
                self.name
            ))),
            other => other,
        }
    }
}

impl fmt::Display for CacheDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}, {:?}, ttl={}s{})",
            self.name,
            self.replication,
            self.consistency,
            self.expiry.ttl.as_secs(),
            if self.expiry.reset_on_access {
                ", sliding"
            } else {
                ""
            }
        )
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries currently held
    pub entries: u64,
    /// Hit ratio in `[0, 1]`
    pub hit_rate: f64,
}

impl CacheStats {
    /// Build stats from raw counters
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counters(hits: u64, misses: u64, entries: u64) -> Self {
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        Self {
            hits,
            misses,
            entries,
            hit_rate,
        }
    }
}
