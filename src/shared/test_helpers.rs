#[cfg(test)]
use crate::modules::storage::{sanitize_object_name, ObjectStorage, StorageError};

#[cfg(test)]
use async_trait::async_trait;

#[cfg(test)]
use std::sync::Mutex;

/// In-memory object storage that records every upload
#[cfg(test)]
#[derive(Default)]
pub struct RecordingStorage {
    pub uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

#[cfg(test)]
impl RecordingStorage {
    pub fn uploaded(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn upload(&self, object_name: &str, data: Vec<u8>) -> Result<String, StorageError> {
        let key = sanitize_object_name(object_name)
            .ok_or_else(|| StorageError::InvalidObjectName(object_name.to_string()))?;
        self.uploads.lock().unwrap().push((key.clone(), data));
        Ok(key)
    }
}

/// Object storage whose bucket check always fails
#[cfg(test)]
pub struct UnreachableStorage;

#[cfg(test)]
#[async_trait]
impl ObjectStorage for UnreachableStorage {
    async fn upload(&self, _object_name: &str, _data: Vec<u8>) -> Result<String, StorageError> {
        Err(StorageError::BucketCheck("connection refused".to_string()))
    }
}
