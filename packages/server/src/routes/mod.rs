use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/v1", v1_routes())
}

fn v1_routes() -> Router<AppState> {
    Router::new().route("/deploy", post(handlers::deploy::deploy))
}

/// Pre-versioning deploy endpoint, kept for older clients.
pub fn legacy_routes() -> Router<AppState> {
    Router::new().route("/deploy", post(handlers::deploy::deploy))
}

/// Content routes: per-project serving plus the fixed routes resolved
/// against the configured default scope.
pub fn site_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/site/{owner}/{project}",
            get(handlers::site::serve_project_index),
        )
        .route(
            "/site/{owner}/{project}/",
            get(handlers::site::serve_project_index),
        )
        .route(
            "/site/{owner}/{project}/{*path}",
            get(handlers::site::serve_project_path),
        )
        .route("/static/{*path}", get(handlers::site::serve_static))
        .route("/assets/{*path}", get(handlers::site::serve_assets))
        .route("/manifest.json", get(handlers::site::serve_manifest))
        .route("/", get(handlers::site::serve_root))
        .route("/{filename}", get(handlers::site::serve_root_file))
}
