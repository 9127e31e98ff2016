use async_trait::async_trait;

use super::error::StorageError;
use super::key::BlobKey;

/// Keyed blob storage for problem and solution documents.
///
/// Writes are not existence-checked here: callers that care about dedup
/// call [`BlobStore::exists`] first.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under the given key, replacing any previous content.
    async fn put(&self, key: &BlobKey, data: &[u8]) -> Result<(), StorageError>;

    /// Retrieve all bytes stored under the key.
    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError>;

    /// Check whether a blob exists.
    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError>;
}
