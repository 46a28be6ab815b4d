//! Filter definitions by usage
//!
//! Bridges signal-detection hypotheses to the filter definitions the legacy
//! schema records for them. The relation runs through three tables:
//! hypothesis -> arrival (account-scoped), arrival -> parameter group and
//! filter id, filter id -> definition. The hypothesis/arrival mapping and the
//! filter definitions are cached between requests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bac_domain::constants::{
    ARRIVAL_HYPOTHESIS_IDS_CACHE, FILTER_DEFINITIONS_BY_USAGE_REQUESTS_CACHE,
    FILTER_DEFINITIONS_CACHE, HYPOTHESIS_ARRIVAL_IDS_CACHE, MAX_KEYS_PER_QUERY,
};
use bac_domain::error::Result;
use bac_domain::ports::LegacyStore;
use bac_domain::value_objects::{
    AccountArrivalId, ArrivalFilterRecord, FilterDefinition, FilterDefinitionRecord,
    FilterDefinitionUsage, HypothesisArrivalRecord, HypothesisId, IdMapping, LegacyFilterId,
    ResolutionResult,
};
use tracing::{debug, warn};

use super::bridging::{Bridge, BridgingResolver, JoinRecord};
use super::lookup::fetch_partitioned;
use crate::cache::{BidirectionalMapping, ClusterHandle, KeyMappingCache, RequestMemoCache};
use crate::ports::services::{FilterDefinitionResolverInterface, FilterDefinitionsByUsage};
use crate::resilience::RetryPolicy;

const REQUEST_KIND: &str = "filter-definitions-by-usage";

/// Legacy tables the bridge reads
#[derive(Clone)]
pub struct FilterDefinitionStores {
    /// Hypothesis -> arrival rows
    pub arrivals: Arc<dyn LegacyStore<HypothesisId, HypothesisArrivalRecord>>,
    /// Arrival -> (parameter group, filter id) rows
    pub filter_parameters: Arc<dyn LegacyStore<AccountArrivalId, ArrivalFilterRecord>>,
    /// Filter id -> definition rows
    pub filter_definitions: Arc<dyn LegacyStore<LegacyFilterId, FilterDefinitionRecord>>,
}

/// Bridge from hypotheses to filter definitions by usage
pub struct FilterDefinitionBridge {
    stores: FilterDefinitionStores,
    arrival_ids: BidirectionalMapping<AccountArrivalId, HypothesisId>,
    definitions: KeyMappingCache<LegacyFilterId, FilterDefinition>,
    retry: RetryPolicy,
    chunk_size: usize,
}

impl FilterDefinitionBridge {
    /// Build the bridge over the standard caches of a cluster
    pub fn new(
        cluster: &ClusterHandle,
        stores: FilterDefinitionStores,
        retry: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self {
            stores,
            arrival_ids: BidirectionalMapping::new(
                cluster.get_cache(ARRIVAL_HYPOTHESIS_IDS_CACHE)?,
                cluster.get_cache(HYPOTHESIS_ARRIVAL_IDS_CACHE)?,
            ),
            definitions: KeyMappingCache::new(cluster.get_cache(FILTER_DEFINITIONS_CACHE)?),
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

    /// The hypothesis/arrival id mapping caches
    pub fn arrival_ids(&self) -> &BidirectionalMapping<AccountArrivalId, HypothesisId> {
        &self.arrival_ids
    }

    /// Arrival of each hypothesis, from the cache first and the store for
    /// the rest. Store hits are written back in both directions.
    async fn arrivals_for(
        &self,
        hypotheses: &[HypothesisId],
    ) -> Result<HashMap<HypothesisId, AccountArrivalId>> {
        let mut arrivals = self.arrival_ids.by_domain().get_all(hypotheses).await?;

        let missing: Vec<HypothesisId> = hypotheses
            .iter()
            .filter(|h| !arrivals.contains_key(*h))
            .copied()
            .collect();
        if missing.is_empty() {
            return Ok(arrivals);
        }

        let batch = fetch_partitioned(
            self.stores.arrivals.as_ref(),
            &missing,
            &self.retry,
            "find_arrivals_by_hypotheses",
            self.chunk_size,
        )
        .await?;
        debug!(
            cached = arrivals.len(),
            requested = batch.requested,
            found = batch.found,
            "Hypothesis arrivals fetched"
        );

        for record in batch.records {
            let mapping = IdMapping::new(record.arrival, record.hypothesis);
            self.arrival_ids.put(&mapping).await?;
            arrivals.insert(mapping.domain_key, mapping.legacy_key);
        }
        Ok(arrivals)
    }
}

#[async_trait]
impl Bridge for FilterDefinitionBridge {
    type Row = HypothesisId;
    type Column = FilterDefinitionUsage;
    type LegacyId = LegacyFilterId;
    type Value = FilterDefinition;

    fn request_kind(&self) -> &str {
        REQUEST_KIND
    }

    async fn join(
        &self,
        rows: &[HypothesisId],
    ) -> Result<ResolutionResult<Vec<JoinRecord<Self>>>> {
        let arrivals = self.arrivals_for(rows).await?;
        let unmapped = rows.iter().filter(|h| !arrivals.contains_key(*h)).count();

        // One arrival may back several hypotheses.
        let mut hypotheses_by_arrival: BTreeMap<AccountArrivalId, Vec<HypothesisId>> =
            BTreeMap::new();
        for (hypothesis, arrival) in arrivals {
            hypotheses_by_arrival
                .entry(arrival)
                .or_default()
                .push(hypothesis);
        }
        let arrival_keys: Vec<AccountArrivalId> = hypotheses_by_arrival.keys().cloned().collect();

        if arrival_keys.is_empty() {
            return Ok(ResolutionResult::from_outcomes(Vec::new(), [unmapped > 0]));
        }

        let batch = fetch_partitioned(
            self.stores.filter_parameters.as_ref(),
            &arrival_keys,
            &self.retry,
            "find_filter_parameters_by_arrivals",
            self.chunk_size,
        )
        .await?;
        let coverage_partial = batch.is_partial();

        let mut records = Vec::with_capacity(batch.records.len());
        let mut unknown_groups = 0usize;
        for record in batch.records {
            let Some(usage) = FilterDefinitionUsage::from_group_name(&record.group_name) else {
                warn!(
                    arrival = %record.arrival,
                    group_name = %record.group_name,
                    "Skipping filter parameters with unknown group name"
                );
                unknown_groups += 1;
                continue;
            };
            if let Some(hypotheses) = hypotheses_by_arrival.get(&record.arrival) {
                records.extend(
                    hypotheses
                        .iter()
                        .map(|hypothesis| (*hypothesis, usage, record.filter_id)),
                );
            }
        }

        if unmapped > 0 || coverage_partial {
            debug!(
                unmapped,
                arrivals_requested = batch.requested,
                arrivals_found = batch.found,
                "Filter parameter join is partial"
            );
        }

        Ok(ResolutionResult::from_outcomes(
            records,
            [unmapped > 0, coverage_partial, unknown_groups > 0],
        ))
    }

    async fn resolve_values(
        &self,
        ids: &[LegacyFilterId],
    ) -> Result<ResolutionResult<HashMap<LegacyFilterId, FilterDefinition>>> {
        let mut definitions = self.definitions.get_all(ids).await?;

        let missing: Vec<LegacyFilterId> = ids
            .iter()
            .filter(|id| !definitions.contains_key(*id))
            .copied()
            .collect();
        if !missing.is_empty() {
            let batch = fetch_partitioned(
                self.stores.filter_definitions.as_ref(),
                &missing,
                &self.retry,
                "find_filter_definitions",
                self.chunk_size,
            )
            .await?;
            for record in batch.records {
                self.definitions
                    .put(&record.filter_id, &record.definition)
                    .await?;
                definitions.insert(record.filter_id, record.definition);
            }
        }

        let partial = ids.iter().any(|id| !definitions.contains_key(id));
        Ok(ResolutionResult::new(definitions, partial))
    }
}

/// Build the memoizing filter-definition resolver over a cluster
pub fn filter_definition_resolver(
    cluster: &ClusterHandle,
    stores: FilterDefinitionStores,
    retry: RetryPolicy,
) -> Result<BridgingResolver<FilterDefinitionBridge>> {
    let bridge = FilterDefinitionBridge::new(cluster, stores, retry)?;
    let memo = RequestMemoCache::new(cluster.get_cache(FILTER_DEFINITIONS_BY_USAGE_REQUESTS_CACHE)?);
    Ok(BridgingResolver::new(Arc::new(bridge), memo))
}

#[async_trait]
impl FilterDefinitionResolverInterface for BridgingResolver<FilterDefinitionBridge> {
    async fn find_filter_definitions_by_usage(
        &self,
        hypotheses: &[HypothesisId],
    ) -> Result<ResolutionResult<FilterDefinitionsByUsage>> {
        self.resolve(hypotheses).await
    }

    async fn invalidate(&self, hypotheses: &[HypothesisId]) -> Result<bool> {
        BridgingResolver::invalidate(self, hypotheses).await
    }
}
