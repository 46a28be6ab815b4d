//! Shared fixtures: an in-memory cluster and scripted legacy stores

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bac_application::cache::{CacheClusterManager, CacheRegistry, ClusterHandle};
use bac_application::resilience::{DelayUnit, RetryPolicy};
use bac_application::use_cases::FilterDefinitionStores;
use bac_domain::error::{Error, Result};
use bac_domain::ports::{LegacyStore, StoreBatch};
use bac_domain::value_objects::{
    AccountArrivalId, ArrivalFilterRecord, FilterDefinition, FilterDefinitionRecord,
    HypothesisArrivalRecord, HypothesisId, LegacyFilterId, PassBandType,
};
use bac_providers::cache::MokaCacheProvider;

/// Join an in-memory cluster with the standard catalog
pub async fn standard_cluster() -> (CacheClusterManager, ClusterHandle) {
    let manager = CacheClusterManager::new();
    let handle = manager
        .initialize_with_provider(
            Arc::new(MokaCacheProvider::with_capacity(100_000)),
            CacheRegistry::standard(),
        )
        .await
        .unwrap();
    (manager, handle)
}

/// Retry policy with short delays for tests that hit failures
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(1, 10, DelayUnit::Milliseconds, 3).unwrap()
}

/// Legacy store backed by a map, counting calls and replaying scripted
/// failures before answering.
pub struct ScriptedStore<K, R> {
    rows: HashMap<K, Vec<R>>,
    failures: Mutex<VecDeque<Error>>,
    calls: AtomicUsize,
    keys_per_call: Mutex<Vec<usize>>,
    delay: Option<Duration>,
}

impl<K: Eq + Hash, R> ScriptedStore<K, R> {
    pub fn new(rows: impl IntoIterator<Item = (K, R)>) -> Self {
        let mut by_key: HashMap<K, Vec<R>> = HashMap::new();
        for (key, row) in rows {
            by_key.entry(key).or_default().push(row);
        }
        Self {
            rows: by_key,
            failures: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            keys_per_call: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Fail the next calls with these errors, in order
    pub fn failing_with(self, errors: impl IntoIterator<Item = Error>) -> Self {
        self.failures.lock().unwrap().extend(errors);
        self
    }

    /// Sleep before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn keys_per_call(&self) -> Vec<usize> {
        self.keys_per_call.lock().unwrap().clone()
    }
}

#[async_trait]
impl<K, R> LegacyStore<K, R> for ScriptedStore<K, R>
where
    K: Eq + Hash + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    async fn find_by_keys(&self, keys: &[K]) -> Result<StoreBatch<R>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.keys_per_call.lock().unwrap().push(keys.len());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.failures.lock().unwrap().pop_front();
        if let Some(err) = failure {
            return Err(err);
        }

        let mut records = Vec::new();
        let mut found = 0;
        for key in keys {
            if let Some(rows) = self.rows.get(key) {
                found += 1;
                records.extend(rows.iter().cloned());
            }
        }
        Ok(StoreBatch::new(records, keys.len(), found))
    }
}

pub fn definition(name: &str) -> FilterDefinition {
    FilterDefinition {
        name: name.to_string(),
        comments: None,
        filter_type: "IIR_BUTTERWORTH".to_string(),
        pass_band: PassBandType::BandPass,
        low_frequency_hz: Some(1.0),
        high_frequency_hz: Some(3.0),
        order: 3,
        causal: true,
    }
}

/// A small legacy schema: hypotheses, their arrivals, filter parameter rows
/// and definitions.
pub struct Fixture {
    pub hypotheses: Vec<HypothesisId>,
    pub arrivals: Arc<ScriptedStore<HypothesisId, HypothesisArrivalRecord>>,
    pub parameters: Arc<ScriptedStore<AccountArrivalId, ArrivalFilterRecord>>,
    pub definitions: Arc<ScriptedStore<LegacyFilterId, FilterDefinitionRecord>>,
}

impl Fixture {
    pub fn stores(&self) -> FilterDefinitionStores {
        FilterDefinitionStores {
            arrivals: self.arrivals.clone(),
            filter_parameters: self.parameters.clone(),
            filter_definitions: self.definitions.clone(),
        }
    }
}

pub struct FixtureBuilder {
    arrivals: Vec<(HypothesisId, HypothesisArrivalRecord)>,
    parameters: Vec<(AccountArrivalId, ArrivalFilterRecord)>,
    definitions: Vec<(LegacyFilterId, FilterDefinitionRecord)>,
    hypotheses: Vec<HypothesisId>,
    arrival_failures: Vec<Error>,
    arrival_delay: Option<Duration>,
}

impl FixtureBuilder {
    pub fn new() -> Self {
        Self {
            arrivals: Vec::new(),
            parameters: Vec::new(),
            definitions: Vec::new(),
            hypotheses: Vec::new(),
            arrival_failures: Vec::new(),
            arrival_delay: None,
        }
    }

    /// Add a hypothesis backed by arrival `arid`
    pub fn hypothesis(mut self, arid: i64) -> Self {
        let hypothesis = HypothesisId::new_random();
        self.arrivals.push((
            hypothesis,
            HypothesisArrivalRecord {
                hypothesis,
                arrival: AccountArrivalId::new("LEB", arid),
            },
        ));
        self.hypotheses.push(hypothesis);
        self
    }

    /// Add a hypothesis with no arrival in the store
    pub fn orphan_hypothesis(mut self) -> Self {
        self.hypotheses.push(HypothesisId::new_random());
        self
    }

    pub fn parameter(mut self, arid: i64, group_name: &str, filter_id: i64) -> Self {
        let arrival = AccountArrivalId::new("LEB", arid);
        self.parameters.push((
            arrival.clone(),
            ArrivalFilterRecord {
                arrival,
                group_name: group_name.to_string(),
                filter_id: LegacyFilterId(filter_id),
            },
        ));
        self
    }

    pub fn definition(mut self, filter_id: i64, name: &str) -> Self {
        self.definitions.push((
            LegacyFilterId(filter_id),
            FilterDefinitionRecord {
                filter_id: LegacyFilterId(filter_id),
                definition: definition(name),
            },
        ));
        self
    }

    pub fn arrival_failures(mut self, errors: impl IntoIterator<Item = Error>) -> Self {
        self.arrival_failures.extend(errors);
        self
    }

    pub fn arrival_delay(mut self, delay: Duration) -> Self {
        self.arrival_delay = Some(delay);
        self
    }

    pub fn build(self) -> Fixture {
        let mut arrivals = ScriptedStore::new(self.arrivals).failing_with(self.arrival_failures);
        if let Some(delay) = self.arrival_delay {
            arrivals = arrivals.with_delay(delay);
        }
        Fixture {
            hypotheses: self.hypotheses,
            arrivals: Arc::new(arrivals),
            parameters: Arc::new(ScriptedStore::new(self.parameters)),
            definitions: Arc::new(ScriptedStore::new(self.definitions)),
        }
    }
}
