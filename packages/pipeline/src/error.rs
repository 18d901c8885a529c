use std::path::PathBuf;

use common::storage::StorageError;
use thiserror::Error;

/// Terminal deployment failures.
///
/// Build command failures never appear here: the build executor consumes
/// them and falls back to a synthesized artifact. Only fetch, artifact and
/// publish problems abort a deployment.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source fetch failed: {0}")]
    Fetch(String),

    #[error("no build artifact found at {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("artifact upload failed: {0}")]
    Publish(#[from] StorageError),

    #[error("workspace IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Io(std::io::Error::other(err))
    }
}
