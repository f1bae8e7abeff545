//! S3-compatible object storage client
//!
//! Stores uploaded files as objects in a single bucket, creating the bucket
//! on demand. Works against IBM COS, MinIO or any S3-compatible service.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use reqwest::Url;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info};

use super::{ObjectStorage, StorageError};
use crate::core::config::ObjectStorageConfig;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// S3-compatible storage client bound to one bucket
pub struct ObjectStorageClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
}

impl ObjectStorageClient {
    /// Create a new client from configuration
    ///
    /// No network traffic happens here; the bucket is checked on every upload.
    pub fn new(config: &ObjectStorageConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Client(format!("create credentials: {}", e)))?;

        let endpoint = normalize_endpoint(&config.endpoint, config.use_ssl)?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| StorageError::Client(format!("create bucket handle: {}", e)))?;

        // Use path-style URLs (https://endpoint/bucket instead of https://bucket.endpoint)
        bucket.set_path_style();

        Ok(Self {
            bucket,
            region,
            credentials,
            endpoint,
        })
    }

    /// Get the bucket name
    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    /// Get the normalized endpoint URL (scheme chosen by the TLS flag)
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `HEAD /<bucket>/`, addressed to the bucket rather than the bucket listing.
    ///
    /// 404 means absent; any other non-2xx status is an error.
    async fn bucket_exists(&self) -> Result<bool, StorageError> {
        // An empty key addresses the bucket root
        let (_, status) = self
            .bucket
            .head_object("/")
            .await
            .map_err(|e| StorageError::BucketCheck(e.to_string()))?;

        match status {
            200..=299 => Ok(true),
            404 => Ok(false),
            other => Err(StorageError::BucketCheck(format!("status {}", other))),
        }
    }

    /// Create the bucket unless it already exists
    async fn ensure_bucket_exists(&self) -> Result<(), StorageError> {
        if self.bucket_exists().await? {
            return Ok(());
        }

        let response = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| StorageError::CreateBucket(e.to_string()))?;

        if !(200..300).contains(&response.response_code) {
            return Err(StorageError::CreateBucket(format!(
                "status {}: {}",
                response.response_code, response.response_text
            )));
        }

        info!("Bucket '{}' created", self.bucket.name());
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for ObjectStorageClient {
    async fn upload(&self, object_name: &str, data: Vec<u8>) -> Result<String, StorageError> {
        let key = sanitize_object_name(object_name)
            .ok_or_else(|| StorageError::InvalidObjectName(object_name.to_string()))?;

        self.ensure_bucket_exists().await?;

        let content_type = content_type_for(&key);
        let response = self
            .bucket
            .put_object_with_content_type(&key, &data, &content_type)
            .await
            .map_err(|e| StorageError::PutObject(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::PutObject(format!("status {}", status)));
        }

        debug!(
            "Uploaded '{}' ({} bytes, {}) to bucket '{}'",
            key,
            data.len(),
            content_type,
            self.bucket.name()
        );
        Ok(key)
    }
}

/// Reduce an object name to its last path component.
///
/// Both `/` and `\` count as separators. Returns `None` when nothing usable
/// is left (`""`, `"."`, `".."`).
pub fn sanitize_object_name(name: &str) -> Option<String> {
    let trimmed = name.trim_end_matches(['/', '\\']);
    let base = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);

    match base {
        "" | "." | ".." => None,
        _ => Some(base.to_string()),
    }
}

/// Build the endpoint URL handed to rust-s3.
///
/// Any scheme in `endpoint` is dropped and only its host (and port) kept;
/// `use_ssl` alone decides between `https` and `http`.
pub fn normalize_endpoint(endpoint: &str, use_ssl: bool) -> Result<String, StorageError> {
    let host = if endpoint.contains("://") {
        let url = Url::parse(endpoint)
            .map_err(|e| StorageError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| StorageError::InvalidEndpoint(format!("{}: no host", endpoint)))?;
        match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    } else {
        endpoint.trim_end_matches('/').to_string()
    };

    if host.is_empty() {
        return Err(StorageError::InvalidEndpoint(endpoint.to_string()));
    }

    let scheme = if use_ssl { "https" } else { "http" };
    Ok(format!("{}://{}", scheme, host))
}

/// MIME type from the object name's extension
pub fn content_type_for(object_name: &str) -> String {
    mime_guess::from_path(object_name)
        .first()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}
