//! Bootstrap tests

use std::sync::Arc;

use async_trait::async_trait;
use bac_application::cache::CacheClusterManager;
use bac_application::use_cases::FilterDefinitionStores;
use bac_domain::constants::FILTER_DEFINITIONS_CACHE;
use bac_domain::error::{Error, Result};
use bac_domain::ports::{LegacyStore, StoreBatch};
use bac_domain::value_objects::{
    AccountArrivalId, ArrivalFilterRecord, ChannelSegmentDescriptor, FilterDefinitionRecord,
    HypothesisArrivalRecord, HypothesisId, LegacyFilterId,
};
use chrono::DateTime;
use bac_infrastructure::bootstrap::{AppContext, init_app};
use bac_infrastructure::config::AppConfig;

struct EmptyStore;

#[async_trait]
impl<K: Send + Sync + 'static, R: Send + 'static> LegacyStore<K, R> for EmptyStore {
    async fn find_by_keys(&self, keys: &[K]) -> Result<StoreBatch<R>> {
        Ok(StoreBatch::new(Vec::new(), keys.len(), 0))
    }
}

fn empty_stores() -> FilterDefinitionStores {
    let store = Arc::new(EmptyStore);
    FilterDefinitionStores {
        arrivals: store.clone() as Arc<dyn LegacyStore<HypothesisId, HypothesisArrivalRecord>>,
        filter_parameters: store.clone()
            as Arc<dyn LegacyStore<AccountArrivalId, ArrivalFilterRecord>>,
        filter_definitions: store as Arc<dyn LegacyStore<LegacyFilterId, FilterDefinitionRecord>>,
    }
}

#[tokio::test]
async fn test_default_config_joins_moka_cluster() {
    let context = init_app(AppConfig::default()).await.unwrap();

    assert_eq!(context.cluster().provider_name(), "moka");
    assert!(context.cluster().get_cache(FILTER_DEFINITIONS_CACHE).is_ok());
    assert_eq!(context.retry_policy().max_attempts(), 5);

    context.shutdown().await.unwrap();
    assert!(!context.cluster().is_active());
}

#[tokio::test]
async fn test_shared_manager_reuses_membership() {
    let manager = Arc::new(CacheClusterManager::new());
    let first = AppContext::with_manager(AppConfig::default(), Arc::clone(&manager))
        .await
        .unwrap();
    first
        .cluster()
        .get_cache(FILTER_DEFINITIONS_CACHE)
        .unwrap()
        .put(&1, &"kept")
        .await
        .unwrap();

    let second = AppContext::with_manager(AppConfig::default(), manager)
        .await
        .unwrap();
    let value: Option<String> = second
        .cluster()
        .get_cache(FILTER_DEFINITIONS_CACHE)
        .unwrap()
        .get(&1)
        .await
        .unwrap();

    assert_eq!(value.as_deref(), Some("kept"));
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_joining() {
    let mut config = AppConfig::default();
    config.cluster.provider = "ignite".to_string();

    let err = init_app(config).await.unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[tokio::test]
async fn test_out_of_range_ttl_fails_without_joining() {
    let mut config = AppConfig::default();
    for cache in &mut config.caches {
        cache.ttl_secs = 100_000_000_000;
    }

    let err = init_app(config).await.unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[tokio::test]
async fn test_context_debug_names_the_transport() {
    let context = init_app(AppConfig::default()).await.unwrap();
    let rendered = format!("{context:?}");
    assert!(rendered.contains("AppContext"));
    assert!(rendered.contains("moka"));
}

#[tokio::test]
async fn test_resolver_reports_unknown_hypotheses_as_partial() {
    let context = init_app(AppConfig::default()).await.unwrap();
    let resolver = context.filter_definition_resolver(empty_stores()).unwrap();

    let result = resolver
        .resolve(&[HypothesisId::new_random()])
        .await
        .unwrap();

    assert!(result.value().is_empty());
    assert!(result.is_partial());
}

#[tokio::test]
async fn test_waveform_ids_report_unknown_segments_as_partial() {
    let context = init_app(AppConfig::default()).await.unwrap();
    let waveform_ids = context
        .channel_segment_waveform_ids(Arc::new(EmptyStore))
        .unwrap();
    let at = |secs| DateTime::from_timestamp(secs, 0).unwrap();
    let segment = ChannelSegmentDescriptor::new("ASAR.AS01.SHZ", at(0), at(60), at(120));

    let result = waveform_ids.find_waveform_ids(&[segment]).await.unwrap();

    assert!(result.value().is_empty());
    assert!(result.is_partial());
}
