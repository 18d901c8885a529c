use std::path::PathBuf;

use serde::Deserialize;

/// App-level object storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    /// Root directory for the filesystem object store. Default: "./data/storage".
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

fn default_storage_root() -> PathBuf {
    "./data/storage".into()
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}
