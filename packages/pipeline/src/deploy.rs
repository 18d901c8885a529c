use std::sync::Arc;

use common::DeployKey;
use common::storage::ObjectStore;
use tracing::{info, instrument};

use crate::build::{BuildExecutor, BuildOutcome};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::fetch::SourceFetcher;
use crate::locate;
use crate::process::ProcessRunner;
use crate::publish::Publisher;
use crate::workspace::WorkspaceManager;

/// One accepted deployment. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    pub source_location: String,
    pub key: DeployKey,
}

/// What a finished deployment produced.
#[derive(Debug, Clone)]
pub struct DeploymentOutcome {
    pub key: DeployKey,
    /// Number of objects written to storage.
    pub uploaded: usize,
    /// True when the artifact is the synthesized fallback page.
    pub degraded: bool,
    /// Name of the build strategy that produced the artifact.
    pub strategy: &'static str,
}

/// Runs the full pipeline for one deployment request: workspace, fetch,
/// locate, build (with repair inside), artifact selection, publish.
///
/// Stages run strictly in order. The per-key workspace lease is held for
/// the whole deployment, so concurrent redeploys of one project serialize.
pub struct Deployer {
    workspaces: WorkspaceManager,
    fetcher: SourceFetcher,
    builder: BuildExecutor,
    publisher: Publisher,
}

impl Deployer {
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn ObjectStore>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            workspaces: WorkspaceManager::new(config.workspaces_root.clone()),
            fetcher: SourceFetcher::new(runner.clone(), config.fetch_timeout()),
            builder: BuildExecutor::new(runner, &config),
            publisher: Publisher::new(store),
        }
    }

    #[instrument(skip(self, request), fields(key = %request.key, source = %request.source_location))]
    pub async fn deploy(
        &self,
        request: &DeploymentRequest,
    ) -> Result<DeploymentOutcome, PipelineError> {
        let _lease = self.workspaces.lease(&request.key).await;

        let workspace = self.workspaces.prepare(&request.key).await?;
        self.fetcher
            .fetch(&request.source_location, &workspace)
            .await?;

        let project_root = {
            let workspace = workspace.clone();
            tokio::task::spawn_blocking(move || locate::find_project_root(&workspace)).await?
        };
        let build = self.builder.build(&project_root).await?;

        let artifact = {
            let project_root = project_root.clone();
            tokio::task::spawn_blocking(move || locate::find_artifact_dir(&project_root)).await?
        };
        let uploaded = self.publisher.publish(&artifact, &request.key).await?;

        let outcome = DeploymentOutcome {
            key: request.key.clone(),
            uploaded,
            degraded: build.is_fallback(),
            strategy: build.strategy(),
        };
        info!(
            uploaded = outcome.uploaded,
            degraded = outcome.degraded,
            strategy = outcome.strategy,
            "Deployment complete"
        );
        Ok(outcome)
    }
}
