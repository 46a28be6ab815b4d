//! Channel segment waveform ids
//!
//! Maps channel segment descriptors to the legacy waveform ids (`wfid`) that
//! hold their samples. The mapping is kept in the replicated
//! `channel-segment-waveform-ids` cache; descriptors missing from it are
//! looked up in the legacy store and written back.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use bac_domain::constants::{CHANNEL_SEGMENT_WAVEFORM_IDS_CACHE, MAX_KEYS_PER_QUERY};
use bac_domain::error::Result;
use bac_domain::ports::LegacyStore;
use bac_domain::value_objects::{
    ChannelSegmentDescriptor, ChannelSegmentWaveformRecord, LegacyWaveformId, ResolutionResult,
};
use tracing::debug;

use super::lookup::fetch_partitioned;
use crate::cache::{ClusterHandle, KeyMappingCache};
use crate::ports::services::{ChannelSegmentWaveformIdsInterface, WaveformIdsByChannelSegment};
use crate::resilience::RetryPolicy;

/// Legacy table relating channel segments to waveforms
pub type ChannelSegmentWaveformStore =
    Arc<dyn LegacyStore<ChannelSegmentDescriptor, ChannelSegmentWaveformRecord>>;

/// Cached lookup of the waveforms behind channel segments
pub struct ChannelSegmentWaveformIds {
    store: ChannelSegmentWaveformStore,
    cache: KeyMappingCache<ChannelSegmentDescriptor, Vec<LegacyWaveformId>>,
    retry: RetryPolicy,
    chunk_size: usize,
}

impl ChannelSegmentWaveformIds {
    /// Build the lookup over the standard cache of a cluster
    pub fn new(
        cluster: &ClusterHandle,
        store: ChannelSegmentWaveformStore,
        retry: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self {
            store,
            cache: KeyMappingCache::new(cluster.get_cache(CHANNEL_SEGMENT_WAVEFORM_IDS_CACHE)?),
            retry,
            chunk_size: MAX_KEYS_PER_QUERY,
        })
    }

    /// Override the number of keys sent per store query
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// The descriptor -> waveform ids cache
    pub fn cache(&self) -> &KeyMappingCache<ChannelSegmentDescriptor, Vec<LegacyWaveformId>> {
        &self.cache
    }

    /// Waveform ids of each descriptor.
    ///
    /// Descriptors with no waveforms in the legacy store are absent from the
    /// map and make the result partial. Ids are sorted and distinct.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a malformed descriptor, before any lookup;
    /// `ResolutionFailed` if the store stays unreachable.
    pub async fn find_waveform_ids(
        &self,
        descriptors: &[ChannelSegmentDescriptor],
    ) -> Result<ResolutionResult<WaveformIdsByChannelSegment>> {
        for descriptor in descriptors {
            descriptor.validate()?;
        }
        if descriptors.is_empty() {
            return Ok(ResolutionResult::empty());
        }

        let distinct: Vec<ChannelSegmentDescriptor> = descriptors
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut found = self.cache.get_all(&distinct).await?;
        let missing: Vec<ChannelSegmentDescriptor> = distinct
            .iter()
            .filter(|d| !found.contains_key(*d))
            .cloned()
            .collect();

        if !missing.is_empty() {
            let batch = fetch_partitioned(
                self.store.as_ref(),
                &missing,
                &self.retry,
                "find_waveform_ids_by_channel_segments",
                self.chunk_size,
            )
            .await?;
            debug!(
                cached = found.len(),
                requested = batch.requested,
                found = batch.found,
                "Channel segment waveform ids fetched"
            );

            let mut fetched: BTreeMap<ChannelSegmentDescriptor, BTreeSet<LegacyWaveformId>> =
                BTreeMap::new();
            for record in batch.records {
                fetched
                    .entry(record.descriptor)
                    .or_default()
                    .insert(record.wfid);
            }
            for (descriptor, wfids) in fetched {
                let wfids: Vec<LegacyWaveformId> = wfids.into_iter().collect();
                self.cache.put(&descriptor, &wfids).await?;
                found.insert(descriptor, wfids);
            }
        }

        let partial = distinct.iter().any(|d| !found.contains_key(d));
        Ok(ResolutionResult::new(found, partial))
    }

    /// Record the waveforms of a segment derived outside the legacy lookup
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a malformed descriptor or cache failures.
    pub async fn record(
        &self,
        descriptor: &ChannelSegmentDescriptor,
        wfids: &[LegacyWaveformId],
    ) -> Result<()> {
        descriptor.validate()?;
        let wfids: Vec<LegacyWaveformId> = wfids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        self.cache.put(descriptor, &wfids).await
    }

    /// Forget the cached waveforms of a segment
    pub async fn invalidate(&self, descriptor: &ChannelSegmentDescriptor) -> Result<bool> {
        self.cache.remove(descriptor).await
    }
}

#[async_trait]
impl ChannelSegmentWaveformIdsInterface for ChannelSegmentWaveformIds {
    async fn find_waveform_ids(
        &self,
        descriptors: &[ChannelSegmentDescriptor],
    ) -> Result<ResolutionResult<WaveformIdsByChannelSegment>> {
        ChannelSegmentWaveformIds::find_waveform_ids(self, descriptors).await
    }

    async fn invalidate(&self, descriptor: &ChannelSegmentDescriptor) -> Result<bool> {
        ChannelSegmentWaveformIds::invalidate(self, descriptor).await
    }
}
