use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::traits::{ObjectStore, StoredObject};
use crate::mime;

/// Filesystem-backed object store.
///
/// Object bytes live under `{root}/objects/{key}` and the recorded content
/// type under `{root}/meta/{key}`. Writes go through a temp file and a
/// rename so a concurrent read never observes a partial object.
pub struct FilesystemObjectStore {
    root: PathBuf,
}

impl FilesystemObjectStore {
    pub async fn new(root: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(root.join("objects")).await?;
        fs::create_dir_all(root.join("meta")).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root })
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join("objects").join(validate_key(key)?))
    }

    fn meta_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join("meta").join(validate_key(key)?))
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }

    async fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Check that a key is a clean relative path and convert it to one.
fn validate_key(key: &str) -> Result<PathBuf, StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key is empty".into()));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "key must not start with '/': {key}"
        )));
    }

    let mut path = PathBuf::new();
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            return Err(StorageError::InvalidKey(format!(
                "key contains invalid segment: {key}"
            )));
        }
        path.push(segment);
    }
    Ok(path)
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError> {
        let object_path = self.object_path(key)?;
        let meta_path = self.meta_path(key)?;

        self.write_atomic(&object_path, bytes).await?;
        self.write_atomic(&meta_path, content_type.as_bytes()).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        let object_path = self.object_path(key)?;
        let bytes = match fs::read(&object_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        // Objects written by older layouts may lack a sidecar; fall back to
        // inferring the type from the key.
        let content_type = match fs::read_to_string(self.meta_path(key)?).await {
            Ok(ct) => ct.trim().to_string(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                mime::content_type_for(key).to_string()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(StoredObject {
            bytes,
            content_type,
        })
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let object_path = self.object_path(key)?;
        Ok(fs::try_exists(&object_path).await?)
    }
}
