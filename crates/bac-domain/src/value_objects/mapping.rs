//! Identifier mappings between the legacy schema and the domain

use serde::{Deserialize, Serialize};

/// A legacy key paired with the domain key it maps to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdMapping<L, D> {
    /// Key in the legacy schema
    pub legacy_key: L,
    /// Key in the domain model
    pub domain_key: D,
}

impl<L, D> IdMapping<L, D> {
    /// Pair a legacy key with a domain key
    pub fn new(legacy_key: L, domain_key: D) -> Self {
        Self {
            legacy_key,
            domain_key,
        }
    }

    /// The same mapping seen from the domain side
    pub fn reversed(self) -> IdMapping<D, L> {
        IdMapping::new(self.domain_key, self.legacy_key)
    }
}

impl<L, D> From<(L, D)> for IdMapping<L, D> {
    fn from((legacy_key, domain_key): (L, D)) -> Self {
        Self::new(legacy_key, domain_key)
    }
}
