//! Request memoization cache tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bac_application::cache::RequestMemoCache;
use bac_domain::constants::FILTER_DEFINITIONS_BY_USAGE_REQUESTS_CACHE;
use bac_domain::error::Error;
use bac_domain::value_objects::{RequestFingerprint, ResolutionResult};

use crate::support::standard_cluster;

fn fingerprint(entities: &[u32]) -> RequestFingerprint {
    RequestFingerprint::builder("test")
        .entities(entities)
        .unwrap()
        .build()
        .unwrap()
}

async fn memo() -> (
    bac_application::cache::CacheClusterManager,
    RequestMemoCache<Vec<u32>>,
) {
    let (manager, cluster) = standard_cluster().await;
    let cache = cluster
        .get_cache(FILTER_DEFINITIONS_BY_USAGE_REQUESTS_CACHE)
        .unwrap();
    (manager, RequestMemoCache::new(cache))
}

#[tokio::test]
async fn test_partial_results_are_memoized() {
    let (_manager, memo) = memo().await;
    let key = fingerprint(&[1, 2]);

    memo.store(&key, ResolutionResult::partial(vec![1]))
        .await
        .unwrap();

    let hit = memo.retrieve(&key).await.unwrap().unwrap();
    assert!(hit.is_partial());
    assert_eq!(hit.value(), &vec![1]);
}

#[tokio::test]
async fn test_store_keeps_first_result() {
    let (_manager, memo) = memo().await;
    let key = fingerprint(&[1]);

    memo.store(&key, ResolutionResult::complete(vec![1]))
        .await
        .unwrap();
    let held = memo
        .store(&key, ResolutionResult::complete(vec![2]))
        .await
        .unwrap();

    assert_eq!(held.value(), &vec![1]);
}

#[tokio::test]
async fn test_invalidate_forces_repopulation() {
    let (_manager, memo) = memo().await;
    let key = fingerprint(&[9]);
    let runs = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let runs = Arc::clone(&runs);
        memo.get_or_populate(key.clone(), move || async move {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(ResolutionResult::complete(vec![9]))
        })
        .await
        .unwrap();
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    assert!(memo.invalidate(&key).await.unwrap());
    assert!(memo.retrieve(&key).await.unwrap().is_none());

    let runs_again = Arc::clone(&runs);
    memo.get_or_populate(key.clone(), move || async move {
        runs_again.fetch_add(1, Ordering::SeqCst);
        Ok(ResolutionResult::complete(vec![9]))
    })
    .await
    .unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failures_are_not_memoized() {
    let (_manager, memo) = memo().await;
    let key = fingerprint(&[3]);

    let err = memo
        .get_or_populate(key.clone(), || async {
            Err(Error::resolution_failed("find", 5, "down"))
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ResolutionFailed { attempts: 5, .. }));
    assert!(memo.retrieve(&key).await.unwrap().is_none());
    assert_eq!(memo.in_flight(), 0);

    let result = memo
        .get_or_populate(key, || async { Ok(ResolutionResult::complete(vec![3])) })
        .await
        .unwrap();
    assert_eq!(result.value(), &vec![3]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_population() {
    let (_manager, memo) = memo().await;
    let memo = Arc::new(memo);
    let key = fingerprint(&[1, 2, 3]);
    let runs = Arc::new(AtomicUsize::new(0));

    let mut tasks = Vec::new();
    for _ in 0..50 {
        let memo = Arc::clone(&memo);
        let key = key.clone();
        let runs = Arc::clone(&runs);
        tasks.push(tokio::spawn(async move {
            memo.get_or_populate(key, move || async move {
                runs.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(ResolutionResult::complete(vec![1, 2, 3]))
            })
            .await
        }));
    }

    for task in tasks {
        let result = task.await.unwrap().unwrap();
        assert_eq!(result.value(), &vec![1, 2, 3]);
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(memo.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_population_survives_cancelled_caller() {
    let (_manager, memo) = memo().await;
    let memo = Arc::new(memo);
    let key = fingerprint(&[4]);
    let runs = Arc::new(AtomicUsize::new(0));

    let first = {
        let memo = Arc::clone(&memo);
        let key = key.clone();
        let runs = Arc::clone(&runs);
        tokio::spawn(async move {
            memo.get_or_populate(key, move || async move {
                runs.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(ResolutionResult::complete(vec![4]))
            })
            .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    first.abort();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let hit = memo.retrieve(&key).await.unwrap().unwrap();
    assert_eq!(hit.value(), &vec![4]);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}
