//! Storage module for file uploads
//!
//! Provides the S3-compatible object storage client and the
//! [`ObjectStorage`] seam the upload route talks to.

mod object_storage_client;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::config::ObjectStorageConfig;

pub use object_storage_client::{sanitize_object_name, ObjectStorageClient};

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("invalid object storage endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("invalid object name: '{0}'")]
    InvalidObjectName(String),

    #[error("create storage client: {0}")]
    Client(String),

    #[error("check bucket exists: {0}")]
    BucketCheck(String),

    #[error("create bucket: {0}")]
    CreateBucket(String),

    #[error("put object: {0}")]
    PutObject(String),
}

/// Destination for uploaded files
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under the base name of `object_name`, creating the bucket
    /// if needed. Returns the key the object was stored under.
    async fn upload(&self, object_name: &str, data: Vec<u8>) -> Result<String, StorageError>;
}

/// Build the storage the upload route uses.
///
/// A configuration the client cannot be built from (an endpoint with no host,
/// say) does not stop the server; every upload then fails with that error.
pub fn connect(config: &ObjectStorageConfig) -> Arc<dyn ObjectStorage> {
    match ObjectStorageClient::new(config) {
        Ok(client) => {
            info!(
                "Object storage client initialized for endpoint: {}, bucket: {}",
                client.endpoint(),
                client.bucket_name()
            );
            Arc::new(client)
        }
        Err(e) => {
            warn!("Object storage unusable, uploads will fail: {}", e);
            Arc::new(UnavailableStorage { error: e })
        }
    }
}

/// Stand-in for a client that could not be built
struct UnavailableStorage {
    error: StorageError,
}

#[async_trait]
impl ObjectStorage for UnavailableStorage {
    async fn upload(&self, _object_name: &str, _data: Vec<u8>) -> Result<String, StorageError> {
        Err(self.error.clone())
    }
}
