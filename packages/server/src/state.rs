use std::sync::Arc;

use common::storage::memory::MemoryObjectStore;
use common::storage::s3::{S3ObjectStore, S3Settings};
use common::storage::{ObjectStore, StorageError};
use sea_orm::DatabaseConnection;

use crate::config::{AppConfig, StorageBackend, StorageConfig};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub store: Arc<dyn ObjectStore>,
    pub config: AppConfig,
}

/// Construct the object store selected by `storage.backend`.
pub fn build_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackend::S3 => {
            let store = S3ObjectStore::new(&S3Settings {
                bucket: config.bucket.clone(),
                region: config.region.clone(),
                endpoint: config.endpoint.clone(),
                access_key: config.access_key.clone(),
                secret_key: config.secret_key.clone(),
            })?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => Ok(Arc::new(MemoryObjectStore::new(
            config.public_base_url.clone(),
        ))),
    }
}
