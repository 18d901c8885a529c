use std::sync::Arc;

use common::storage::ObjectStore;
use pipeline::Deployer;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub deployer: Arc<Deployer>,
    pub config: AppConfig,
}
