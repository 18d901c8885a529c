use common::config::StorageAppConfig;
use config::{Config, ConfigError, Environment, File};
use pipeline::PipelineConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

fn default_cors_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: CorsConfig::default(),
        }
    }
}

/// Deployment scope backing the fixed serving routes (`/`, `/static`,
/// `/assets`, root files).
#[derive(Debug, Deserialize, Clone)]
pub struct ServingConfig {
    #[serde(default = "default_owner")]
    pub default_owner: String,
    #[serde(default = "default_project")]
    pub default_project: String,
}

fn default_owner() -> String {
    "anon".into()
}
fn default_project() -> String {
    "demo".into()
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            default_owner: default_owner(),
            default_project: default_project(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageAppConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub serving: ServingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("SITEFORGE_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., SITEFORGE__SERVER__PORT)
            .add_source(Environment::with_prefix("SITEFORGE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
