use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::FilesystemObjectStore;
use pipeline::Deployer;
use tracing::{Level, info};

use server::config::AppConfig;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let store = Arc::new(
        FilesystemObjectStore::new(config.storage.root.clone())
            .await
            .context("Failed to initialize object store")?,
    );
    let deployer = Arc::new(Deployer::new(
        config.pipeline.clone(),
        store.clone(),
        Arc::new(pipeline::process::TokioProcessRunner),
    ));

    let state = AppState {
        store,
        deployer,
        config: config.clone(),
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host / server.port")?;
    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
