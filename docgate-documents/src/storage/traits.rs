//! Storage backend traits

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Host used when building public object URLs
pub const DEFAULT_STORAGE_HOST: &str = "s3.amazonaws.com";

/// Errors from storage operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    /// A conditional write found the key already taken
    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Credentials missing or rejected: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Other(String),
}

/// Public URL of an object: `https://{bucket}.{host}/{key}`
pub fn public_url(bucket: &str, host: &str, key: &str) -> String {
    format!("https://{}.{}/{}", bucket, host, key)
}

/// Abstract storage backend trait
///
/// Implementations are shared between concurrent requests, so every call is
/// a self-contained operation against the backend.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Metadata-only lookup. `Ok(false)` only when the backend says the key is absent.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Write an object with its content type and return its public URL
    async fn put(&self, key: &str, content: Bytes, content_type: &str)
        -> Result<String, StorageError>;

    /// Remove an object
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Public URL for a key, without touching the backend
    fn object_url(&self, key: &str) -> String;
}
