use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::fs;
use tracing::{info, instrument, warn};

use crate::error::PipelineError;
use crate::process::{CommandSpec, ProcessRunner};

/// Materializes a source repository into a workspace directory.
///
/// Tries a shallow clone first; if that fails (some hosts and proxies
/// reject shallow fetches), retries with a full clone into a fresh
/// directory. Only both strategies failing is fatal.
pub struct SourceFetcher {
    runner: Arc<dyn ProcessRunner>,
    timeout: Duration,
}

impl SourceFetcher {
    pub fn new(runner: Arc<dyn ProcessRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, source: &str, dest: &Path) -> Result<(), PipelineError> {
        let dest_str = dest.to_string_lossy().into_owned();

        let shallow = CommandSpec::new(
            "git",
            &["clone", "--depth", "1", source, &dest_str],
            cwd_for(dest),
            self.timeout,
        );
        match self.attempt(&shallow).await {
            Ok(()) => return Ok(()),
            Err(reason) => {
                warn!(source, reason, "Shallow clone failed, retrying with full clone");
            }
        }

        // The failed attempt may have left a partial checkout behind.
        let _ = fs::remove_dir_all(dest).await;
        fs::create_dir_all(dest).await?;

        let full = CommandSpec::new(
            "git",
            &["clone", source, &dest_str],
            cwd_for(dest),
            self.timeout,
        );
        match self.attempt(&full).await {
            Ok(()) => Ok(()),
            Err(reason) => Err(PipelineError::Fetch(format!(
                "both clone strategies failed for {source}: {reason}"
            ))),
        }
    }

    async fn attempt(&self, spec: &CommandSpec) -> Result<(), String> {
        match self.runner.run(spec).await {
            Ok(outcome) if outcome.success() => {
                info!(command = %spec.display(), duration = ?outcome.duration, "Clone succeeded");
                Ok(())
            }
            Ok(outcome) => Err(format!(
                "{} exited with {:?}: {}",
                spec.display(),
                outcome.exit_code,
                outcome.output_tail
            )),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// `git clone` creates the destination itself; run from its parent.
fn cwd_for(dest: &Path) -> std::path::PathBuf {
    dest.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| std::env::temp_dir())
}
