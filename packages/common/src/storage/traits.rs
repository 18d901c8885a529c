use async_trait::async_trait;

use super::error::StorageError;

/// An object retrieved from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Key-addressed object storage.
///
/// Keys are `/`-joined paths with no leading slash, e.g.
/// `users/alice/blog/index.html`. Writes to an existing key overwrite it
/// (last writer wins); there is no versioning.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under a key with the given content type.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// Retrieve an object by key. Returns `StorageError::NotFound` on miss.
    async fn get(&self, key: &str) -> Result<StoredObject, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}
