// ABOUTME: Object storage for user avatars
// ABOUTME: Wraps object_store backends (memory, local disk, S3/MinIO) with public URL resolution

use std::path::Path as FsPath;
use std::sync::Arc;

use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use tracing::debug;

use crate::StorageError;

/// Connection settings for an S3-compatible bucket such as MinIO
#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
}

/// Object store plus the base URL under which stored objects are publicly served
#[derive(Clone)]
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    base_url: String,
}

impl ObjectStorage {
    pub fn new(store: Arc<dyn ObjectStore>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn in_memory(base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(InMemory::new()), base_url)
    }

    pub fn local(root: impl AsRef<FsPath>, base_url: impl Into<String>) -> Result<Self, StorageError> {
        std::fs::create_dir_all(root.as_ref())?;
        let store = LocalFileSystem::new_with_prefix(root.as_ref())?;
        Ok(Self::new(Arc::new(store), base_url))
    }

    pub fn s3(config: &S3Config, base_url: impl Into<String>) -> Result<Self, StorageError> {
        let store = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_access_key_id(&config.access_key)
            .with_secret_access_key(&config.secret_key)
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_allow_http(config.endpoint.starts_with("http://"))
            .build()?;
        Ok(Self::new(Arc::new(store), base_url))
    }

    fn object_path(key: &str) -> Result<Path, StorageError> {
        Path::parse(key).map_err(|_| StorageError::InvalidObjectKey(key.to_string()))
    }

    pub async fn put_object(&self, key: &str, payload: impl Into<Bytes>) -> Result<(), StorageError> {
        let path = Self::object_path(key)?;
        debug!("Storing object: {}", key);
        self.store
            .put(&path, PutPayload::from_bytes(payload.into()))
            .await?;
        Ok(())
    }

    /// Fetch an object's bytes. Missing objects map to [`StorageError::NotFound`].
    pub async fn get_object(&self, key: &str) -> Result<Bytes, StorageError> {
        let path = Self::object_path(key)?;
        match self.store.get(&path).await {
            Ok(result) => Ok(result.bytes().await?),
            Err(object_store::Error::NotFound { .. }) => Err(StorageError::NotFound),
            Err(e) => Err(StorageError::Object(e)),
        }
    }

    pub async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        let path = Self::object_path(key)?;
        match self.store.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(StorageError::Object(e)),
        }
    }

    /// Public URL for `key`
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }
}
