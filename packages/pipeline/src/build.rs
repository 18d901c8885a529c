use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::process::{CommandSpec, ProcessRunner};
use crate::repair::{FRAMEWORK_CONFIG_NAMES, RepairEngine};

/// Terminal states of the build state machine. There is no failure
/// variant: exhausting every strategy produces a synthesized artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded { strategy: &'static str },
    Fallback,
}

impl BuildOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Succeeded { strategy } => strategy,
            Self::Fallback => "fallback-synthesis",
        }
    }
}

/// Ordered generic build attempts, tried until one succeeds.
const GENERIC_ATTEMPTS: [(&str, &str, &[&str]); 3] = [
    ("npm-build", "npm", &["run", "build"]),
    ("npm-build-force", "npm", &["run", "build", "--", "--force"]),
    ("npx-vite", "npx", &["--yes", "vite", "build"]),
];

/// Runs the framework-aware build chain:
/// detect, install, repair, build, and on failure degrade through generic
/// strategies down to fallback synthesis.
pub struct BuildExecutor {
    runner: Arc<dyn ProcessRunner>,
    install_timeout: Duration,
    build_timeout: Duration,
}

impl BuildExecutor {
    pub fn new(runner: Arc<dyn ProcessRunner>, config: &PipelineConfig) -> Self {
        Self {
            runner,
            install_timeout: config.install_timeout(),
            build_timeout: config.build_timeout(),
        }
    }

    /// Drive the build to a terminal state. Individual command failures
    /// transition to the next strategy and never escape; the only errors
    /// returned are I/O failures from the executor's own filesystem work.
    #[instrument(skip(self), fields(project_root = %project_root.display()))]
    pub async fn build(&self, project_root: &Path) -> Result<BuildOutcome, PipelineError> {
        let framework = {
            let root = project_root.to_path_buf();
            tokio::task::spawn_blocking(move || detect_framework(&root)).await?
        };
        info!(framework, "Build detection complete");

        // Non-strict install: version conflicts are tolerated rather than
        // aborting. An install failure is not terminal either; the build
        // attempts below will fail and degrade on their own.
        self.attempt(
            project_root,
            "npm-install",
            "npm",
            &["install", "--legacy-peer-deps"],
            self.install_timeout,
        )
        .await;

        if framework {
            // The repair engine walks and rewrites files synchronously;
            // keep it off the async workers.
            let root = project_root.to_path_buf();
            tokio::task::spawn_blocking(move || RepairEngine::run_all(&root)).await?;

            if self
                .attempt(
                    project_root,
                    "framework-build",
                    "npm",
                    &["run", "build"],
                    self.build_timeout,
                )
                .await
            {
                self.attempt_static_export(project_root).await;
                return Ok(BuildOutcome::Succeeded {
                    strategy: "framework-build",
                });
            }

            // Primary build failed. Never retry the same command: rewrite
            // the manifest for a generic bundler and fall through.
            warn!("Framework build failed, degrading to generic bundler");
            let root = project_root.to_path_buf();
            tokio::task::spawn_blocking(move || {
                RepairEngine::rewrite_manifest_build_script(&root, "vite build")
            })
            .await?;
            if !project_root.join("node_modules/vite").is_dir() {
                self.attempt(
                    project_root,
                    "install-vite",
                    "npm",
                    &["install", "--save-dev", "vite", "--legacy-peer-deps"],
                    self.install_timeout,
                )
                .await;
            }
        }

        for (strategy, program, args) in GENERIC_ATTEMPTS {
            if self
                .attempt(project_root, strategy, program, args, self.build_timeout)
                .await
            {
                return Ok(BuildOutcome::Succeeded { strategy });
            }
        }

        warn!("All build strategies exhausted, synthesizing fallback artifact");
        synthesize_fallback(project_root).await?;
        Ok(BuildOutcome::Fallback)
    }

    /// Secondary static export after a successful framework build. Export
    /// failure alone is not fatal when a known output directory exists.
    async fn attempt_static_export(&self, project_root: &Path) {
        if self
            .attempt(
                project_root,
                "static-export",
                "npm",
                &["run", "export"],
                self.build_timeout,
            )
            .await
        {
            return;
        }

        let has_output = project_root.join("out").is_dir() || project_root.join(".next").is_dir();
        if has_output {
            info!("Static export failed but build output exists, continuing");
        } else {
            warn!("Static export failed and no build output directory found");
        }
    }

    /// Run one named strategy; any runner error (including timeout) counts
    /// as a failed attempt.
    async fn attempt(
        &self,
        project_root: &Path,
        strategy: &'static str,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> bool {
        let spec = CommandSpec::new(program, args, project_root, timeout);
        match self.runner.run(&spec).await {
            Ok(outcome) if outcome.success() => {
                info!(strategy, duration = ?outcome.duration, "Build step succeeded");
                true
            }
            Ok(outcome) => {
                warn!(
                    strategy,
                    exit_code = ?outcome.exit_code,
                    tail = %outcome.output_tail,
                    "Build step failed"
                );
                false
            }
            Err(e) => {
                warn!(strategy, error = %e, "Build step did not run");
                false
            }
        }
    }
}

/// A project is framework-shaped when it carries a framework config file
/// or its manifest declares the framework as a dependency. The second
/// check is what routes config-less framework projects through the repair
/// engine, where the missing config gets synthesized.
fn detect_framework(project_root: &Path) -> bool {
    let has_config = FRAMEWORK_CONFIG_NAMES
        .iter()
        .any(|name| project_root.join(name).is_file());
    has_config || manifest_declares_framework(project_root)
}

fn manifest_declares_framework(project_root: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(project_root.join("package.json")) else {
        return false;
    };
    let Ok(manifest) = serde_json::from_str::<serde_json::Value>(&content) else {
        return false;
    };
    ["dependencies", "devDependencies"].iter().any(|section| {
        manifest[*section]
            .as_object()
            .is_some_and(|deps| deps.contains_key("next"))
    })
}

/// Guaranteed terminal state: write a minimal status page so the pipeline
/// always has something servable to publish.
async fn synthesize_fallback(project_root: &Path) -> Result<(), PipelineError> {
    let dist = project_root.join("dist");
    tokio::fs::create_dir_all(&dist).await?;
    tokio::fs::write(dist.join("index.html"), FALLBACK_PAGE).await?;
    Ok(())
}

const FALLBACK_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Build unavailable</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 4rem auto; max-width: 40rem; padding: 0 1rem; color: #333; }
    h1 { font-size: 1.5rem; }
    code { background: #f4f4f4; padding: 0.1rem 0.3rem; border-radius: 3px; }
  </style>
</head>
<body>
  <h1>This site could not be built</h1>
  <p>Every build strategy for this deployment failed, so this placeholder
  page was published instead. Check that the repository's
  <code>build</code> script produces a static site, then redeploy.</p>
</body>
</html>
"#;
