//! Bridging Resolver
//!
//! Enriches a batch of domain entities with values held in the legacy
//! schema. A [`Bridge`] supplies the two store-facing steps; the resolver
//! runs the pipeline around them:
//!
//! 1. empty input returns an empty, complete result;
//! 2. the request fingerprint is looked up in the memoization cache;
//! 3. the bridge joins the distinct entities to (row, column, legacy id)
//!    records;
//! 4. the distinct legacy ids are resolved to values in one batch;
//! 5. records are paired with their values, unresolved ones dropped;
//! 6. the partial flag is the OR of every step's outcome;
//! 7. the result is memoized and returned.
//!
//! Missing data yields `partial = true`. Store failures that survive the
//! retry policy fail the whole batch and are not memoized.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use bac_domain::error::Result;
use bac_domain::value_objects::{AssociationTable, RequestFingerprint, ResolutionResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cache::RequestMemoCache;

/// A join record: row key, column key and the legacy id of its value
pub type JoinRecord<B> = (<B as Bridge>::Row, <B as Bridge>::Column, <B as Bridge>::LegacyId);

/// Association table produced by a bridge
pub type BridgeTable<B> =
    AssociationTable<<B as Bridge>::Row, <B as Bridge>::Column, <B as Bridge>::Value>;

/// Store-facing steps of one bridged relation
#[async_trait]
pub trait Bridge: Send + Sync + 'static {
    /// Domain entity being enriched
    type Row: Clone + Ord + Hash + Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Second key dimension of the association
    type Column: Clone + Ord + Hash + Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Legacy identifier of a value
    type LegacyId: Clone + Ord + Hash + Send + Sync + 'static;
    /// Resolved value
    type Value: Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Request kind that namespaces fingerprints
    fn request_kind(&self) -> &str;

    /// Selection parameters that take part in the fingerprint
    fn request_parameters(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Join distinct rows to their records
    async fn join(
        &self,
        rows: &[Self::Row],
    ) -> Result<ResolutionResult<Vec<(Self::Row, Self::Column, Self::LegacyId)>>>;

    /// Resolve distinct legacy ids; unresolved ids are left out
    async fn resolve_values(
        &self,
        ids: &[Self::LegacyId],
    ) -> Result<ResolutionResult<HashMap<Self::LegacyId, Self::Value>>>;
}

/// Memoizing resolver for one bridge
pub struct BridgingResolver<B: Bridge> {
    bridge: Arc<B>,
    memo: RequestMemoCache<BridgeTable<B>>,
}

impl<B: Bridge> BridgingResolver<B> {
    /// Create a resolver memoizing into `memo`
    pub fn new(bridge: Arc<B>, memo: RequestMemoCache<BridgeTable<B>>) -> Self {
        Self { bridge, memo }
    }

    /// The wrapped bridge
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// The memoization cache
    pub fn memo(&self) -> &RequestMemoCache<BridgeTable<B>> {
        &self.memo
    }

    /// Fingerprint of a request for these rows
    pub fn fingerprint(&self, rows: &[B::Row]) -> Result<RequestFingerprint> {
        RequestFingerprint::builder(self.bridge.request_kind())
            .entities(rows)?
            .parameters(&self.bridge.request_parameters())
            .build()
    }

    /// Resolve a batch of rows
    pub async fn resolve(&self, rows: &[B::Row]) -> Result<ResolutionResult<BridgeTable<B>>> {
        if rows.is_empty() {
            return Ok(ResolutionResult::empty());
        }

        let fingerprint = self.fingerprint(rows)?;
        let distinct: Vec<B::Row> = rows
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let bridge = Arc::clone(&self.bridge);

        self.memo
            .get_or_populate(fingerprint, move || run_pipeline(bridge, distinct))
            .await
    }

    /// Forget the memoized result for these rows
    pub async fn invalidate(&self, rows: &[B::Row]) -> Result<bool> {
        if rows.is_empty() {
            return Ok(false);
        }
        let fingerprint = self.fingerprint(rows)?;
        self.memo.invalidate(&fingerprint).await
    }
}

async fn run_pipeline<B: Bridge>(
    bridge: Arc<B>,
    rows: Vec<B::Row>,
) -> Result<ResolutionResult<BridgeTable<B>>> {
    let (records, join_partial) = bridge.join(&rows).await?.into_parts();

    let ids: Vec<B::LegacyId> = records
        .iter()
        .map(|(_, _, id)| id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let (values, values_partial) = if ids.is_empty() {
        (HashMap::new(), false)
    } else {
        bridge.resolve_values(&ids).await?.into_parts()
    };
    let unresolved = ids.iter().filter(|id| !values.contains_key(*id)).count();

    let (table, dropped) = BridgeTable::<B>::assemble(records, &values);

    debug!(
        kind = bridge.request_kind(),
        rows = rows.len(),
        legacy_ids = ids.len(),
        unresolved,
        dropped,
        cells = table.len(),
        "Bridged resolution assembled"
    );

    Ok(ResolutionResult::from_outcomes(
        table,
        [join_partial, values_partial, unresolved > 0, dropped > 0],
    ))
}
