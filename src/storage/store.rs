//! Object-store contract and the combinators built on top of it

use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::errors::Result;

/// Storage operations the orchestrator depends on
///
/// Implemented by the GCS adapter in production and by an in-memory store in
/// tests. Keys are plain strings; prefix semantics are byte-wise.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Durably write `bytes` at `bucket`/`key`, overwriting any existing object
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<()>;

    /// List the keys of every object whose key starts with `prefix`
    async fn list_by_prefix(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    /// Delete one object; deleting an absent object is a success
    async fn delete(&self, bucket: &str, key: &str) -> Result<()>;

    /// Copy an object between buckets
    ///
    /// With `only_if_absent` the copy fails with a routing conflict when the
    /// destination key already holds an object.
    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
        only_if_absent: bool,
    ) -> Result<()>;
}

/// Delete every object under `prefix`, returning how many were removed
///
/// A prefix with zero matches is a success with count 0, so cleanup stays
/// idempotent when it races an earlier pass.
pub async fn delete_by_prefix(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
) -> Result<usize> {
    let keys = store.list_by_prefix(bucket, prefix).await?;
    for key in &keys {
        store.delete(bucket, key).await?;
    }
    info!(
        "Temporary objects with prefix '{}' deleted from gs://{} ({} removed)",
        prefix,
        bucket,
        keys.len()
    );
    Ok(keys.len())
}

/// Move an object to another bucket via copy-then-delete
///
/// The copy carries an only-if-absent precondition: an object already present
/// at the destination aborts the move instead of being overwritten.
pub async fn move_object(
    store: &dyn ObjectStore,
    src_bucket: &str,
    key: &str,
    dst_bucket: &str,
) -> Result<()> {
    store.copy(src_bucket, key, dst_bucket, key, true).await?;
    store.delete(src_bucket, key).await?;
    debug!("Moved gs://{}/{} to gs://{}/{}", src_bucket, key, dst_bucket, key);
    Ok(())
}
