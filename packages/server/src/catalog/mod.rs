//! The relational ledger of problems and solutions, backed by the blob tree
//! for document bytes.
//!
//! Blobs are written before the rows that reference them. A failure between
//! the two leaves an unreferenced blob, never a row without its payload.

mod admin;
mod problems;
mod records;
mod solutions;

use std::sync::Arc;

use common::BlobStore;
use common::storage::filesystem::FilesystemBlobStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::database::init_db;
use crate::error::Result;

#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
    blobs: Arc<dyn BlobStore>,
}

impl Catalog {
    pub fn new(db: DatabaseConnection, blobs: Arc<dyn BlobStore>) -> Self {
        Self { db, blobs }
    }

    /// Connect to the configured database, sync the schema and open the blob tree.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let db = init_db(&config.database.url, config.database.max_connections).await?;
        let blobs = Arc::new(FilesystemBlobStore::new(&config.storage.base_path));
        Ok(Self::new(db, blobs))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }
}
