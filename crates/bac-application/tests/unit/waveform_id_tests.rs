//! Channel segment waveform-id lookup tests

use std::sync::Arc;

use bac_application::use_cases::{ChannelSegmentWaveformIds, ChannelSegmentWaveformStore};
use bac_domain::error::Error;
use bac_domain::value_objects::{
    ChannelSegmentDescriptor, ChannelSegmentWaveformRecord, LegacyWaveformId,
};
use chrono::{DateTime, Utc};

use crate::support::{ScriptedStore, fast_retry, standard_cluster};

type WaveformStore = ScriptedStore<ChannelSegmentDescriptor, ChannelSegmentWaveformRecord>;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn segment(channel: &str, start: i64) -> ChannelSegmentDescriptor {
    ChannelSegmentDescriptor::new(channel, at(0), at(start), at(start + 60))
}

fn rows(pairs: &[(&ChannelSegmentDescriptor, i64)]) -> Arc<WaveformStore> {
    Arc::new(ScriptedStore::new(pairs.iter().map(|(descriptor, wfid)| {
        (
            (*descriptor).clone(),
            ChannelSegmentWaveformRecord {
                descriptor: (*descriptor).clone(),
                wfid: LegacyWaveformId(*wfid),
            },
        )
    })))
}

fn as_store(store: &Arc<WaveformStore>) -> ChannelSegmentWaveformStore {
    store.clone()
}

#[tokio::test]
async fn test_store_rows_are_grouped_and_cached() {
    let (a, b) = (segment("ASAR.AS01.SHZ", 100), segment("ASAR.AS02.SHZ", 100));
    let store = rows(&[(&a, 7), (&a, 3), (&a, 7), (&b, 9)]);
    let (_manager, cluster) = standard_cluster().await;
    let lookup = ChannelSegmentWaveformIds::new(&cluster, as_store(&store), fast_retry()).unwrap();

    let first = lookup.find_waveform_ids(&[a.clone(), b.clone()]).await.unwrap();
    let second = lookup.find_waveform_ids(&[b.clone(), a.clone()]).await.unwrap();

    assert!(!first.is_partial());
    assert_eq!(
        first.value().get(&a),
        Some(&vec![LegacyWaveformId(3), LegacyWaveformId(7)])
    );
    assert_eq!(first.value().get(&b), Some(&vec![LegacyWaveformId(9)]));
    assert_eq!(first, second);
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn test_segments_without_waveforms_are_partial() {
    let (a, b) = (segment("ASAR.AS01.SHZ", 100), segment("ASAR.AS01.SHZ", 500));
    let store = rows(&[(&a, 1)]);
    let (_manager, cluster) = standard_cluster().await;
    let lookup = ChannelSegmentWaveformIds::new(&cluster, as_store(&store), fast_retry()).unwrap();

    let result = lookup.find_waveform_ids(&[a.clone(), b.clone()]).await.unwrap();

    assert!(result.is_partial());
    assert_eq!(result.value().len(), 1);
    assert!(result.value().contains_key(&a));
    assert!(!result.value().contains_key(&b));
}

#[tokio::test]
async fn test_malformed_segment_is_rejected_before_lookup() {
    let store = rows(&[]);
    let (_manager, cluster) = standard_cluster().await;
    let lookup = ChannelSegmentWaveformIds::new(&cluster, as_store(&store), fast_retry()).unwrap();
    let reversed = ChannelSegmentDescriptor::new("ASAR.AS01.SHZ", at(0), at(200), at(100));

    let err = lookup
        .find_waveform_ids(&[segment("ASAR.AS01.SHZ", 100), reversed])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_empty_and_duplicate_input() {
    let a = segment("ASAR.AS01.SHZ", 100);
    let store = rows(&[(&a, 1)]);
    let (_manager, cluster) = standard_cluster().await;
    let lookup = ChannelSegmentWaveformIds::new(&cluster, as_store(&store), fast_retry()).unwrap();

    let empty = lookup.find_waveform_ids(&[]).await.unwrap();
    assert!(empty.value().is_empty());
    assert!(!empty.is_partial());
    assert_eq!(store.calls(), 0);

    lookup
        .find_waveform_ids(&[a.clone(), a.clone(), a])
        .await
        .unwrap();
    assert_eq!(store.keys_per_call(), vec![1]);
}

#[tokio::test]
async fn test_recorded_segments_skip_the_store_until_invalidated() {
    let a = segment("ASAR.AS01.SHZ", 100);
    let store = rows(&[(&a, 4)]);
    let (_manager, cluster) = standard_cluster().await;
    let lookup = ChannelSegmentWaveformIds::new(&cluster, as_store(&store), fast_retry()).unwrap();

    lookup
        .record(&a, &[LegacyWaveformId(8), LegacyWaveformId(8)])
        .await
        .unwrap();
    let recorded = lookup.find_waveform_ids(&[a.clone()]).await.unwrap();
    assert_eq!(recorded.value().get(&a), Some(&vec![LegacyWaveformId(8)]));
    assert_eq!(store.calls(), 0);

    assert!(lookup.invalidate(&a).await.unwrap());
    let reloaded = lookup.find_waveform_ids(&[a.clone()]).await.unwrap();
    assert_eq!(reloaded.value().get(&a), Some(&vec![LegacyWaveformId(4)]));
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn test_mapping_is_shared_across_lookups_on_one_cluster() {
    let a = segment("ASAR.AS01.SHZ", 100);
    let store = rows(&[(&a, 5)]);
    let (_manager, cluster) = standard_cluster().await;
    let writer = ChannelSegmentWaveformIds::new(&cluster, as_store(&store), fast_retry()).unwrap();
    let reader = ChannelSegmentWaveformIds::new(&cluster, as_store(&store), fast_retry()).unwrap();

    writer.find_waveform_ids(&[a.clone()]).await.unwrap();
    let cached = reader.cache().get(&a).await.unwrap();

    assert_eq!(cached, Some(vec![LegacyWaveformId(5)]));
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn test_lookups_are_chunked() {
    let segments: Vec<ChannelSegmentDescriptor> =
        (0..5).map(|i| segment("ASAR.AS01.SHZ", i * 100)).collect();
    let pairs: Vec<(&ChannelSegmentDescriptor, i64)> =
        segments.iter().zip(1..).map(|(s, wfid)| (s, wfid)).collect();
    let store = rows(&pairs);
    let (_manager, cluster) = standard_cluster().await;
    let lookup = ChannelSegmentWaveformIds::new(&cluster, as_store(&store), fast_retry())
        .unwrap()
        .with_chunk_size(2);

    let result = lookup.find_waveform_ids(&segments).await.unwrap();

    assert!(!result.is_partial());
    assert_eq!(result.value().len(), 5);
    assert_eq!(store.keys_per_call(), vec![2, 2, 1]);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let a = segment("ASAR.AS01.SHZ", 100);
    let store = Arc::new(
        ScriptedStore::new([(
            a.clone(),
            ChannelSegmentWaveformRecord {
                descriptor: a.clone(),
                wfid: LegacyWaveformId(2),
            },
        )])
        .failing_with([
            Error::store_connectivity("connection reset"),
            Error::store_connectivity("connection reset"),
        ]),
    );
    let (_manager, cluster) = standard_cluster().await;
    let lookup = ChannelSegmentWaveformIds::new(&cluster, as_store(&store), fast_retry()).unwrap();

    let result = lookup.find_waveform_ids(&[a.clone()]).await.unwrap();

    assert_eq!(result.value().get(&a), Some(&vec![LegacyWaveformId(2)]));
    assert_eq!(store.calls(), 3);
}

#[tokio::test]
async fn test_exhausted_retries_fail_without_caching() {
    let a = segment("ASAR.AS01.SHZ", 100);
    let store: Arc<WaveformStore> = Arc::new(ScriptedStore::new([]).failing_with([
        Error::store_connectivity("down"),
        Error::store_connectivity("down"),
        Error::store_connectivity("down"),
    ]));
    let (_manager, cluster) = standard_cluster().await;
    let lookup = ChannelSegmentWaveformIds::new(&cluster, as_store(&store), fast_retry()).unwrap();

    let err = lookup.find_waveform_ids(&[a.clone()]).await.unwrap_err();
    match err {
        Error::ResolutionFailed {
            operation,
            attempts,
            ..
        } => {
            assert_eq!(operation, "find_waveform_ids_by_channel_segments");
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(lookup.cache().get(&a).await.unwrap(), None);
}
