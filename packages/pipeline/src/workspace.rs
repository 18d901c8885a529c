use std::path::PathBuf;
use std::sync::Arc;

use common::DeployKey;
use dashmap::DashMap;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

/// Allocates and recycles per-deployment working directories.
///
/// Each `(owner, project)` key owns one directory under the workspaces
/// root and one async mutex, so concurrent redeploys of the same project
/// serialize instead of racing on cleanup and storage keys.
pub struct WorkspaceManager {
    root: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl WorkspaceManager {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            locks: DashMap::new(),
        }
    }

    /// Directory for a deployment key. Key segments are validated at
    /// construction, so joining them is safe.
    pub fn dir(&self, key: &DeployKey) -> PathBuf {
        self.root.join(key.owner_id()).join(key.project_id())
    }

    /// Acquire the exclusive lease for a key. Held for the whole deployment.
    pub async fn lease(&self, key: &DeployKey) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Remove any previous workspace for the key (best effort) and create a
    /// fresh directory.
    pub async fn prepare(&self, key: &DeployKey) -> std::io::Result<PathBuf> {
        let dir = self.dir(key);

        if fs::try_exists(&dir).await.unwrap_or(false) {
            if let Err(e) = fs::remove_dir_all(&dir).await {
                warn!(workspace = %dir.display(), error = %e, "Failed to clean previous workspace");
            }
        }

        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }
}
