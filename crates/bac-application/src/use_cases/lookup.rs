//! Partitioned legacy-store lookups
//!
//! The legacy store caps the number of keys per query, so large key sets are
//! split into chunks. Each chunk runs under the retry policy on its own and
//! chunk coverage is summed.

use bac_domain::error::Result;
use bac_domain::ports::{LegacyStore, StoreBatch};
use tracing::trace;

use crate::resilience::RetryPolicy;

/// Fetch records for `keys` in chunks of at most `chunk_size`
pub async fn fetch_partitioned<K, R>(
    store: &dyn LegacyStore<K, R>,
    keys: &[K],
    retry: &RetryPolicy,
    operation: &str,
    chunk_size: usize,
) -> Result<StoreBatch<R>>
where
    K: Send + Sync + 'static,
    R: Send + 'static,
{
    let mut total = StoreBatch::empty();
    for (index, chunk) in keys.chunks(chunk_size.max(1)).enumerate() {
        let batch = retry
            .execute(operation, || store.find_by_keys(chunk))
            .await?;
        trace!(
            operation,
            chunk = index,
            requested = batch.requested,
            found = batch.found,
            "Store chunk fetched"
        );
        total.merge(batch);
    }
    Ok(total)
}
