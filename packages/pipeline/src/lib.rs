pub mod build;
pub mod config;
pub mod deploy;
pub mod error;
pub mod fetch;
pub mod locate;
pub mod process;
pub mod publish;
pub mod repair;
pub mod workspace;

pub use config::PipelineConfig;
pub use deploy::{Deployer, DeploymentOutcome, DeploymentRequest};
pub use error::PipelineError;
