//! Tests for batched store outcomes

use bac_domain::ports::StoreBatch;

#[test]
fn test_batch_is_partial_when_keys_missing() {
    let batch = StoreBatch::new(vec!["a", "b"], 3, 2);
    assert!(batch.is_partial());

    let batch = StoreBatch::new(vec!["a", "b", "c"], 3, 3);
    assert!(!batch.is_partial());
}

#[test]
fn test_merge_sums_chunk_coverage() {
    let mut total = StoreBatch::new(vec![1, 2], 1000, 1000);
    total.merge(StoreBatch::new(vec![3], 5, 4));

    assert_eq!(total.records, vec![1, 2, 3]);
    assert_eq!(total.requested, 1005);
    assert_eq!(total.found, 1004);
    assert!(total.is_partial());
}

#[test]
fn test_empty_batch_is_complete() {
    let batch: StoreBatch<u8> = StoreBatch::empty();
    assert!(!batch.is_partial());
    assert!(batch.records.is_empty());
}
