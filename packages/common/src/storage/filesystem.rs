use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::key::BlobKey;
use super::traits::BlobStore;

/// Filesystem-backed blob store.
///
/// Layout: `{base_path}/problems/{id}.json` and
/// `{base_path}/solutions/{sha256 hex}.json`. Nothing is created on disk
/// until the first write.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
}

impl FilesystemBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Compute the filesystem path for a given key.
    pub fn blob_path(&self, key: &BlobKey) -> PathBuf {
        self.base_path.join(key.relative_path())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, key: &BlobKey, data: &[u8]) -> Result<(), StorageError> {
        let blob_path = self.blob_path(key);
        let temp_path = self.temp_path();

        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = blob_path.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                let _ = fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
        }

        // Rename is atomic within one filesystem, so readers never see a torn blob.
        if let Err(e) = fs::rename(&temp_path, &blob_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(key = %key, bytes = data.len(), "Stored blob");
        Ok(())
    }

    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.blob_path(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.blob_path(key)).await?)
    }
}
