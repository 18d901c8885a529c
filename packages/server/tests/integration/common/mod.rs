use std::net::SocketAddr;
use std::sync::Arc;

use common::storage::{FilesystemObjectStore, ObjectStore};
use pipeline::process::TokioProcessRunner;
use pipeline::{Deployer, PipelineConfig};
use reqwest::Client;
use serde_json::Value;
use tempfile::TempDir;

use server::config::{AppConfig, ServingConfig};
use server::state::AppState;

pub mod routes {
    pub const DEPLOY: &str = "/api/v1/deploy";

    pub fn site(owner: &str, project: &str, path: &str) -> String {
        format!("/site/{owner}/{project}/{path}")
    }
}

/// A running test server backed by temp-dir storage and workspaces.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<FilesystemObjectStore>,
    _storage_dir: TempDir,
    _workspaces_dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
    pub content_type: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let storage_dir = TempDir::new().expect("Failed to create storage temp dir");
        let workspaces_dir = TempDir::new().expect("Failed to create workspaces temp dir");

        let store = Arc::new(
            FilesystemObjectStore::new(storage_dir.path().to_path_buf())
                .await
                .expect("Failed to initialize object store"),
        );

        let app_config = AppConfig {
            pipeline: PipelineConfig {
                workspaces_root: workspaces_dir.path().to_path_buf(),
                ..Default::default()
            },
            serving: ServingConfig {
                default_owner: "anon".to_string(),
                default_project: "demo".to_string(),
            },
            ..Default::default()
        };

        let deployer = Arc::new(Deployer::new(
            app_config.pipeline.clone(),
            store.clone(),
            Arc::new(TokioProcessRunner),
        ));

        let state = AppState {
            store: store.clone(),
            deployer,
            config: app_config,
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            store,
            _storage_dir: storage_dir,
            _workspaces_dir: workspaces_dir,
        }
    }

    /// Seed an object directly into the backing store.
    pub async fn seed(&self, key: &str, bytes: &[u8], content_type: &str) {
        self.store
            .put(key, bytes, content_type)
            .await
            .expect("Failed to seed object");
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Self {
            status,
            text,
            body,
            content_type,
        }
    }
}
