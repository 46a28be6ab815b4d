//! Request Memoization Cache
//!
//! Memoizes whole resolution results by request fingerprint, partial results
//! included. Failures are never stored.
//!
//! At most one population runs per fingerprint:
//!
//! - inside the process, concurrent callers for one fingerprint join a
//!   single shared population; the population runs on its own task, so a
//!   caller dropping its future does not cancel work others wait on;
//! - across processes, the result is written with put-if-absent and a
//!   process that loses the race adopts the value already stored.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bac_domain::error::{Error, Result};
use bac_domain::value_objects::{RequestFingerprint, ResolutionResult};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::cluster::CacheHandle;

type Population<T> = Shared<BoxFuture<'static, Result<ResolutionResult<T>>>>;

struct InFlight<T> {
    generation: u64,
    population: Population<T>,
}

/// Fingerprint-keyed cache of resolution results
pub struct RequestMemoCache<T> {
    handle: CacheHandle,
    in_flight: Arc<DashMap<RequestFingerprint, InFlight<T>>>,
    generations: AtomicU64,
}

impl<T> std::fmt::Debug for RequestMemoCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestMemoCache")
            .field("cache", &self.handle.name())
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl<T> RequestMemoCache<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Wrap a cache handle
    pub fn new(handle: CacheHandle) -> Self {
        Self {
            handle,
            in_flight: Arc::new(DashMap::new()),
            generations: AtomicU64::new(0),
        }
    }

    /// Name of the backing cache
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Memoized result for a fingerprint, if any
    pub async fn retrieve(
        &self,
        fingerprint: &RequestFingerprint,
    ) -> Result<Option<ResolutionResult<T>>> {
        self.handle.get(fingerprint).await
    }

    /// Store a result unless one is already memoized.
    ///
    /// Returns the result now held by the cache, which is the stored one
    /// when another writer got there first.
    pub async fn store(
        &self,
        fingerprint: &RequestFingerprint,
        result: ResolutionResult<T>,
    ) -> Result<ResolutionResult<T>> {
        store_converged(&self.handle, fingerprint, result).await
    }

    /// Forget a memoized result so the next request resolves again
    pub async fn invalidate(&self, fingerprint: &RequestFingerprint) -> Result<bool> {
        let removed = self.handle.remove(fingerprint).await?;
        debug!(cache = self.name(), %fingerprint, removed, "Memoized result invalidated");
        Ok(removed)
    }

    /// Number of populations currently running
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Return the memoized result or run `populate` to produce it.
    ///
    /// Concurrent calls for the same fingerprint share one run of
    /// `populate`; its error, if any, reaches every waiting caller and
    /// nothing is memoized.
    pub async fn get_or_populate<F, Fut>(
        &self,
        fingerprint: RequestFingerprint,
        populate: F,
    ) -> Result<ResolutionResult<T>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<ResolutionResult<T>>> + Send + 'static,
    {
        if let Some(hit) = self.retrieve(&fingerprint).await? {
            debug!(cache = self.name(), %fingerprint, "Memoized result hit");
            return Ok(hit);
        }

        let population = match self.in_flight.entry(fingerprint.clone()) {
            Entry::Occupied(entry) => {
                debug!(cache = self.name(), %fingerprint, "Joining in-flight population");
                entry.get().population.clone()
            }
            Entry::Vacant(entry) => {
                let generation = self.generations.fetch_add(1, Ordering::Relaxed);
                let population = self.spawn_population(fingerprint.clone(), generation, populate);
                entry.insert(InFlight {
                    generation,
                    population: population.clone(),
                });
                population
            }
        };

        population.await
    }

    fn spawn_population<F, Fut>(
        &self,
        fingerprint: RequestFingerprint,
        generation: u64,
        populate: F,
    ) -> Population<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<ResolutionResult<T>>> + Send + 'static,
    {
        let handle = self.handle.clone();
        let in_flight = Arc::clone(&self.in_flight);

        let work = async move {
            let outcome = populate_once(&handle, &fingerprint, populate).await;
            in_flight.remove_if(&fingerprint, |_, entry| entry.generation == generation);
            outcome
        };

        // The task is spawned on first poll, after the slot is registered.
        async move {
            tokio::spawn(work)
                .await
                .map_err(|e| Error::internal(format!("Population task failed: {e}")))?
        }
        .boxed()
        .shared()
    }
}

async fn populate_once<T, F, Fut>(
    handle: &CacheHandle,
    fingerprint: &RequestFingerprint,
    populate: F,
) -> Result<ResolutionResult<T>>
where
    T: Serialize + DeserializeOwned + Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<ResolutionResult<T>>>,
{
    // A population that finished between our miss and claiming the slot
    // has already stored its result.
    if let Some(hit) = handle.get(fingerprint).await? {
        return Ok(hit);
    }

    let result = match populate().await {
        Ok(result) => result,
        Err(err) => {
            warn!(cache = handle.name(), %fingerprint, error = %err, "Population failed");
            return Err(err);
        }
    };
    store_converged(handle, fingerprint, result).await
}

async fn store_converged<T>(
    handle: &CacheHandle,
    fingerprint: &RequestFingerprint,
    result: ResolutionResult<T>,
) -> Result<ResolutionResult<T>>
where
    T: Serialize + DeserializeOwned,
{
    match handle.put_if_absent(fingerprint, &result).await? {
        Some(existing) => {
            debug!(cache = handle.name(), %fingerprint, "Adopted result stored by another writer");
            Ok(existing)
        }
        None => {
            debug!(
                cache = handle.name(),
                %fingerprint,
                partial = result.is_partial(),
                "Memoized resolution result"
            );
            Ok(result)
        }
    }
}
