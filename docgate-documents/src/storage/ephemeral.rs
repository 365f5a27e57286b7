//! In-memory ephemeral storage backend

use super::traits::*;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory stored object
#[derive(Debug, Clone)]
struct InMemoryObject {
    data: Bytes,
    content_type: String,
}

/// Ephemeral (in-memory) storage backend
///
/// Used for local runs without a bucket and as the storage double in tests.
pub struct EphemeralStorage {
    bucket: String,
    public_host: String,
    conditional_writes: bool,
    objects: DashMap<String, InMemoryObject>,
}

impl Default for EphemeralStorage {
    fn default() -> Self {
        Self::new("local-bucket")
    }
}

impl EphemeralStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            public_host: DEFAULT_STORAGE_HOST.to_string(),
            conditional_writes: true,
            objects: DashMap::new(),
        }
    }

    pub fn with_public_host(mut self, host: impl Into<String>) -> Self {
        self.public_host = host.into();
        self
    }

    /// Allow `put` to overwrite an existing key instead of failing
    pub fn with_conditional_writes(mut self, enabled: bool) -> Self {
        self.conditional_writes = enabled;
        self
    }

    /// Content and content type of a stored object
    pub fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects
            .get(key)
            .map(|obj| (obj.data.clone(), obj.content_type.clone()))
    }
}

#[async_trait]
impl DocumentStorage for EphemeralStorage {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.objects.contains_key(key))
    }

    async fn put(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let object = InMemoryObject {
            data: content,
            content_type: content_type.to_string(),
        };

        match self.objects.entry(key.to_string()) {
            Entry::Occupied(_) if self.conditional_writes => {
                return Err(StorageError::AlreadyExists(key.to_string()));
            }
            Entry::Occupied(mut slot) => {
                slot.insert(object);
            }
            Entry::Vacant(slot) => {
                slot.insert(object);
            }
        }

        Ok(self.object_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn object_url(&self, key: &str) -> String {
        public_url(&self.bucket, &self.public_host, key)
    }
}
