//! Key-mapping cache tests

use bac_application::cache::{BidirectionalMapping, KeyMappingCache};
use bac_domain::constants::{
    ARRIVAL_HYPOTHESIS_IDS_CACHE, FILTER_DEFINITIONS_CACHE, HYPOTHESIS_ARRIVAL_IDS_CACHE,
};
use bac_domain::value_objects::{AccountArrivalId, HypothesisId, IdMapping, LegacyFilterId};

use crate::support::{definition, standard_cluster};

#[tokio::test]
async fn test_get_all_returns_only_found_keys() {
    let (_manager, cluster) = standard_cluster().await;
    let cache = KeyMappingCache::new(cluster.get_cache(FILTER_DEFINITIONS_CACHE).unwrap());

    cache.put(&LegacyFilterId(1), &definition("one")).await.unwrap();
    cache.put(&LegacyFilterId(3), &definition("three")).await.unwrap();

    let found = cache
        .get_all(&[LegacyFilterId(1), LegacyFilterId(2), LegacyFilterId(3)])
        .await
        .unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[&LegacyFilterId(3)].name, "three");
    assert!(!found.contains_key(&LegacyFilterId(2)));
}

#[tokio::test]
async fn test_latest_write_wins() {
    let (_manager, cluster) = standard_cluster().await;
    let cache = KeyMappingCache::new(cluster.get_cache(FILTER_DEFINITIONS_CACHE).unwrap());

    cache.put(&LegacyFilterId(1), &definition("old")).await.unwrap();
    cache.put(&LegacyFilterId(1), &definition("new")).await.unwrap();

    let value = cache.get(&LegacyFilterId(1)).await.unwrap().unwrap();
    assert_eq!(value.name, "new");

    assert!(cache.remove(&LegacyFilterId(1)).await.unwrap());
    assert!(cache.get(&LegacyFilterId(1)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_bidirectional_put_writes_both_directions() {
    let (_manager, cluster) = standard_cluster().await;
    let mapping: BidirectionalMapping<AccountArrivalId, HypothesisId> = BidirectionalMapping::new(
        cluster.get_cache(ARRIVAL_HYPOTHESIS_IDS_CACHE).unwrap(),
        cluster.get_cache(HYPOTHESIS_ARRIVAL_IDS_CACHE).unwrap(),
    );
    let hypothesis = HypothesisId::new_random();
    let arrival = AccountArrivalId::new("LEB", 1001);

    mapping
        .put(&IdMapping::new(arrival.clone(), hypothesis))
        .await
        .unwrap();

    assert_eq!(
        mapping.by_legacy().get(&arrival).await.unwrap(),
        Some(hypothesis)
    );
    assert_eq!(
        mapping.by_domain().get(&hypothesis).await.unwrap(),
        Some(arrival)
    );
}

#[tokio::test]
async fn test_put_all_records_every_mapping() {
    let (_manager, cluster) = standard_cluster().await;
    let mapping: BidirectionalMapping<AccountArrivalId, HypothesisId> = BidirectionalMapping::new(
        cluster.get_cache(ARRIVAL_HYPOTHESIS_IDS_CACHE).unwrap(),
        cluster.get_cache(HYPOTHESIS_ARRIVAL_IDS_CACHE).unwrap(),
    );
    let mappings: Vec<_> = (0..5)
        .map(|arid| IdMapping::new(AccountArrivalId::new("LEB", arid), HypothesisId::new_random()))
        .collect();

    mapping.put_all(&mappings).await.unwrap();

    let domain_keys: Vec<HypothesisId> = mappings.iter().map(|m| m.domain_key).collect();
    let found = mapping.by_domain().get_all(&domain_keys).await.unwrap();
    assert_eq!(found.len(), 5);
}
