//! Legacy Store Port
//!
//! The relational legacy schema is reached through batched key lookups. A
//! lookup reports how many of the requested keys it actually found so the
//! bridging layer can flag partial coverage without treating it as an error.
//!
//! Implementations classify their failures: connectivity problems as
//! [`Error::StoreConnectivity`](crate::error::Error::StoreConnectivity)
//! (retried), anything else as
//! [`Error::StoreQuery`](crate::error::Error::StoreQuery) (not retried).

use async_trait::async_trait;

use crate::error::Result;

/// Outcome of one batched lookup
#[derive(Debug, Clone, PartialEq)]
pub struct StoreBatch<R> {
    /// Records returned by the store
    pub records: Vec<R>,
    /// Number of distinct keys asked for
    pub requested: usize,
    /// Number of requested keys with at least one record
    pub found: usize,
}

impl<R> StoreBatch<R> {
    /// Build a batch outcome
    pub fn new(records: Vec<R>, requested: usize, found: usize) -> Self {
        Self {
            records,
            requested,
            found,
        }
    }

    /// Outcome of a lookup that asked for nothing
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0)
    }

    /// Whether some requested keys were not found
    pub fn is_partial(&self) -> bool {
        self.found < self.requested
    }

    /// Fold another chunk's outcome into this one
    pub fn merge(&mut self, other: StoreBatch<R>) {
        self.records.extend(other.records);
        self.requested += other.requested;
        self.found += other.found;
    }
}

impl<R> Default for StoreBatch<R> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Batched lookup of legacy records by key
#[async_trait]
pub trait LegacyStore<K, R>: Send + Sync
where
    K: Send + Sync + 'static,
    R: Send + 'static,
{
    /// Fetch the records for a set of distinct keys
    async fn find_by_keys(&self, keys: &[K]) -> Result<StoreBatch<R>>;
}
