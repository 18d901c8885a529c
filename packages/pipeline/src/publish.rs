use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::storage::ObjectStore;
use common::{DeployKey, mime};
use tracing::{debug, info, instrument};

use crate::error::PipelineError;

/// Uploads an artifact directory tree to object storage under a
/// deployment-scoped key prefix.
///
/// There is no partial-upload rollback: a failure partway through leaves
/// earlier objects in place and fails the deployment; a later redeploy
/// overwrites them key by key.
pub struct Publisher {
    store: Arc<dyn ObjectStore>,
}

impl Publisher {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Upload every regular file beneath `artifact_dir`, returning the
    /// number of objects written.
    #[instrument(skip(self), fields(artifact = %artifact_dir.display(), key = %key))]
    pub async fn publish(
        &self,
        artifact_dir: &Path,
        key: &DeployKey,
    ) -> Result<usize, PipelineError> {
        let files = {
            let dir = artifact_dir.to_path_buf();
            tokio::task::spawn_blocking(move || collect_files(&dir)).await??
        };
        if files.is_empty() {
            return Err(PipelineError::ArtifactMissing(artifact_dir.to_path_buf()));
        }

        let mut uploaded = 0;
        for (path, relative) in files {
            let bytes = tokio::fs::read(&path).await?;
            let object_key = key.object_key(&relative);
            let content_type = mime::content_type_for(&relative);

            self.store
                .put(&object_key, &bytes, content_type)
                .await
                .map_err(PipelineError::Publish)?;

            debug!(object_key, content_type, size = bytes.len(), "Uploaded object");
            uploaded += 1;
        }

        info!(uploaded, "Artifact published");
        Ok(uploaded)
    }
}

/// Walk the artifact tree iteratively, collecting `(absolute path,
/// '/'-joined relative path)` pairs for every regular file.
fn collect_files(artifact_dir: &Path) -> Result<Vec<(PathBuf, String)>, PipelineError> {
    if !artifact_dir.is_dir() {
        return Err(PipelineError::ArtifactMissing(artifact_dir.to_path_buf()));
    }

    let mut files = Vec::new();
    let mut stack: Vec<(PathBuf, String)> = vec![(artifact_dir.to_path_buf(), String::new())];

    while let Some((dir, prefix)) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let relative = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };

            if path.is_dir() {
                stack.push((path, relative));
            } else if path.is_file() {
                files.push((path, relative));
            }
        }
    }

    Ok(files)
}
