use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Deployment pipeline configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Root directory for per-deployment workspaces. Default: "./data/workspaces".
    #[serde(default = "default_workspaces_root")]
    pub workspaces_root: PathBuf,
    /// Timeout for each source fetch attempt, in seconds. Default: 120.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Timeout for each dependency install, in seconds. Default: 600.
    #[serde(default = "default_install_timeout_secs")]
    pub install_timeout_secs: u64,
    /// Timeout for each build command, in seconds. Default: 600.
    #[serde(default = "default_build_timeout_secs")]
    pub build_timeout_secs: u64,
}

fn default_workspaces_root() -> PathBuf {
    "./data/workspaces".into()
}
fn default_fetch_timeout_secs() -> u64 {
    120
}
fn default_install_timeout_secs() -> u64 {
    600
}
fn default_build_timeout_secs() -> u64 {
    600
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workspaces_root: default_workspaces_root(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            install_timeout_secs: default_install_timeout_secs(),
            build_timeout_secs: default_build_timeout_secs(),
        }
    }
}

impl PipelineConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }
}
