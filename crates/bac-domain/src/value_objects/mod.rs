//! Domain Value Objects
//!
//! Immutable values shared by the caching and bridging layers.
//!
//! ## Value Objects
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`CacheDescriptor`] | Named cache with replication, consistency and expiry |
//! | [`IdMapping`] | Legacy key paired with a domain key |
//! | [`RequestFingerprint`] | Order-independent digest of a request |
//! | [`ResolutionResult`] | Best-effort value with a partial flag |
//! | [`AssociationTable`] | Two-key (row, column) lookup |
//! | [`FilterDefinitionUsage`] | Usage a filter definition is bound to |
//! | [`ChannelSegmentDescriptor`] | Channel version over a time span |

/// Cache descriptor value objects
pub mod cache;
/// Request fingerprints
pub mod fingerprint;
/// Legacy/domain identifier mappings
pub mod mapping;
/// Resolution results and association tables
pub mod resolution;
/// Seismic identifiers and legacy records
pub mod seismic;

pub use cache::{CacheDescriptor, CacheStats, ConsistencyMode, ExpiryPolicy, ReplicationMode};
pub use fingerprint::{FingerprintBuilder, RequestFingerprint};
pub use mapping::IdMapping;
pub use resolution::{AssociationTable, ResolutionResult};
pub use seismic::{
    AccountArrivalId, ArrivalFilterRecord, ChannelSegmentDescriptor, ChannelSegmentWaveformRecord,
    FilterDefinition, FilterDefinitionRecord, FilterDefinitionUsage, HypothesisArrivalRecord,
    HypothesisId, LegacyFilterId, LegacyWaveformId, PassBandType,
};
