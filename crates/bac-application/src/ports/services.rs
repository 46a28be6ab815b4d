//! Service interfaces exposed to the owning domain services

use std::collections::HashMap;

use async_trait::async_trait;
use bac_domain::error::Result;
use bac_domain::value_objects::{
    AssociationTable, ChannelSegmentDescriptor, FilterDefinition, FilterDefinitionUsage,
    HypothesisId, LegacyWaveformId, ResolutionResult,
};

/// Filter definitions keyed by (hypothesis, usage)
pub type FilterDefinitionsByUsage =
    AssociationTable<HypothesisId, FilterDefinitionUsage, FilterDefinition>;

/// Resolves the filter definitions bound to signal-detection hypotheses
#[async_trait]
pub trait FilterDefinitionResolverInterface: Send + Sync {
    /// Filter definitions by usage for a batch of hypotheses.
    ///
    /// Hypotheses or filters missing from the legacy store yield a partial
    /// result, not an error.
    async fn find_filter_definitions_by_usage(
        &self,
        hypotheses: &[HypothesisId],
    ) -> Result<ResolutionResult<FilterDefinitionsByUsage>>;

    /// Drop the memoized result for this batch so the next call resolves
    /// again
    async fn invalidate(&self, hypotheses: &[HypothesisId]) -> Result<bool>;
}

/// Legacy waveform ids keyed by channel segment
pub type WaveformIdsByChannelSegment = HashMap<ChannelSegmentDescriptor, Vec<LegacyWaveformId>>;

/// Finds the legacy waveforms behind channel segments
#[async_trait]
pub trait ChannelSegmentWaveformIdsInterface: Send + Sync {
    /// Waveform ids for a batch of channel segments; segments without
    /// waveforms make the result partial
    async fn find_waveform_ids(
        &self,
        descriptors: &[ChannelSegmentDescriptor],
    ) -> Result<ResolutionResult<WaveformIdsByChannelSegment>>;

    /// Drop the cached waveform ids of one segment
    async fn invalidate(&self, descriptor: &ChannelSegmentDescriptor) -> Result<bool>;
}
