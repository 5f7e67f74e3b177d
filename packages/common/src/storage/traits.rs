use std::time::Duration;

use async_trait::async_trait;

use super::error::StorageError;

/// Everything a pre-signed PUT is scoped to.
///
/// The backend must sign the content type, content length and owner
/// metadata so that the client cannot upload anything else to `key`.
#[derive(Debug, Clone, Copy)]
pub struct PutTarget<'a> {
    pub key: &'a str,
    pub content_type: &'a str,
    pub content_length: u64,
    /// Recorded as `user-id` object metadata for traceability.
    pub owner_id: &'a str,
    pub expires_in: Duration,
}

/// Bucket operations the server needs. Bytes never pass through the server:
/// clients upload directly to the URL returned by [`ObjectStore::presign_put`].
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Issue a time-limited URL permitting a single `PUT` to `target.key`.
    async fn presign_put(&self, target: PutTarget<'_>) -> Result<String, StorageError>;

    /// Delete the object stored under `key`.
    ///
    /// Deleting a key that holds no object succeeds, matching S3 semantics.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Check whether an object is stored under `key`.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}
