//! Cluster manager and cache handle tests

use std::sync::Arc;

use bac_application::cache::{CacheClusterManager, CacheRegistry};
use bac_application::ports::registry::CacheProviderConfig;
use bac_domain::constants::{FILTER_DEFINITIONS_CACHE, HYPOTHESIS_ARRIVAL_IDS_CACHE};
use bac_domain::error::Error;
use bac_domain::value_objects::CacheDescriptor;
use bac_providers::cache::MokaCacheProvider;

use crate::support::standard_cluster;

#[tokio::test]
async fn test_initialize_is_idempotent_while_active() {
    let manager = CacheClusterManager::new();
    let config = CacheProviderConfig::new("moka");

    let first = manager
        .initialize(&config, CacheRegistry::standard())
        .await
        .unwrap();
    first
        .get_cache(FILTER_DEFINITIONS_CACHE)
        .unwrap()
        .put(&1, &"bandpass")
        .await
        .unwrap();

    let second = manager
        .initialize(&config, CacheRegistry::standard())
        .await
        .unwrap();
    let value: Option<String> = second
        .get_cache(FILTER_DEFINITIONS_CACHE)
        .unwrap()
        .get(&1)
        .await
        .unwrap();

    assert_eq!(value.as_deref(), Some("bandpass"));
    assert!(manager.current().await.is_some());
}

#[tokio::test]
async fn test_unknown_transport_is_a_configuration_error() {
    let manager = CacheClusterManager::new();
    let err = manager
        .initialize(&CacheProviderConfig::new("ignite"), CacheRegistry::standard())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert!(manager.current().await.is_none());
}

#[tokio::test]
async fn test_unknown_cache_name() {
    let (_manager, cluster) = standard_cluster().await;
    assert_eq!(
        cluster.get_cache("waveforms").unwrap_err(),
        Error::unknown_cache("waveforms")
    );
}

#[tokio::test]
async fn test_handles_fail_after_shutdown() {
    let (manager, cluster) = standard_cluster().await;
    let cache = cluster.get_cache(HYPOTHESIS_ARRIVAL_IDS_CACHE).unwrap();
    cache.put(&"h", &"a").await.unwrap();

    manager.shutdown().await.unwrap();

    assert!(!cluster.is_active());
    assert!(matches!(
        cache.get::<_, String>(&"h").await,
        Err(Error::CacheUnavailable { .. })
    ));
    assert!(matches!(
        cluster.get_cache(HYPOTHESIS_ARRIVAL_IDS_CACHE),
        Err(Error::CacheUnavailable { .. })
    ));
    assert!(manager.current().await.is_none());
}

#[tokio::test]
async fn test_reinitialize_after_shutdown_starts_fresh_membership() {
    let manager = CacheClusterManager::new();
    let registry = CacheRegistry::register([CacheDescriptor::new("ids")]).unwrap();

    let first = manager
        .initialize_with_provider(Arc::new(MokaCacheProvider::new()), registry.clone())
        .await
        .unwrap();
    manager.shutdown().await.unwrap();

    let second = manager
        .initialize_with_provider(Arc::new(MokaCacheProvider::new()), registry)
        .await
        .unwrap();

    assert!(!first.is_active());
    assert!(second.is_active());
    assert!(second.get_cache("ids").is_ok());
}

#[tokio::test]
async fn test_put_if_absent_returns_existing_value() {
    let (_manager, cluster) = standard_cluster().await;
    let cache = cluster.get_cache(FILTER_DEFINITIONS_CACHE).unwrap();

    assert_eq!(cache.put_if_absent(&7, &"first".to_string()).await.unwrap(), None);
    assert_eq!(
        cache.put_if_absent(&7, &"second".to_string()).await.unwrap(),
        Some("first".to_string())
    );
}

#[tokio::test]
async fn test_stats_reflect_cache_traffic() {
    let (_manager, cluster) = standard_cluster().await;
    let cache = cluster.get_cache(FILTER_DEFINITIONS_CACHE).unwrap();
    cache.put(&1, &"one").await.unwrap();
    let _: Option<String> = cache.get(&1).await.unwrap();
    let _: Option<String> = cache.get(&2).await.unwrap();

    let stats = cluster.stats().await.unwrap();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}
