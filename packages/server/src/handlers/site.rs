use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::storage::StorageError;
use common::{DeployKey, mime};
use tracing::{debug, error, instrument};

use crate::state::AppState;

/// Serve a file from a path-scoped project: `/site/{owner}/{project}/{*path}`.
#[instrument(skip(state))]
pub async fn serve_project_path(
    State(state): State<AppState>,
    Path((owner, project, path)): Path<(String, String, String)>,
) -> Response {
    let Ok(key) = DeployKey::new(owner, project) else {
        return not_found();
    };
    resolve(&state, &key, &path).await
}

/// Serve a project's index: `/site/{owner}/{project}`.
#[instrument(skip(state))]
pub async fn serve_project_index(
    State(state): State<AppState>,
    Path((owner, project)): Path<(String, String)>,
) -> Response {
    let Ok(key) = DeployKey::new(owner, project) else {
        return not_found();
    };
    resolve(&state, &key, "").await
}

/// Serve `/static/{*path}` from the default deployment scope.
pub async fn serve_static(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    serve_default_scope(&state, &format!("static/{path}")).await
}

/// Serve `/assets/{*path}` from the default deployment scope.
pub async fn serve_assets(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    serve_default_scope(&state, &format!("assets/{path}")).await
}

/// Serve `/manifest.json` from the default deployment scope.
pub async fn serve_manifest(State(state): State<AppState>) -> Response {
    serve_default_scope(&state, "manifest.json").await
}

/// Serve `/` (the default scope's index document).
pub async fn serve_root(State(state): State<AppState>) -> Response {
    serve_default_scope(&state, "").await
}

/// Serve a single-segment root file such as `/favicon.ico`. An extension
/// is required; extensionless single segments are not routed to the
/// default scope.
pub async fn serve_root_file(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    if !filename.contains('.') {
        return not_found();
    }
    serve_default_scope(&state, &filename).await
}

async fn serve_default_scope(state: &AppState, relative_path: &str) -> Response {
    let serving = &state.config.serving;
    let key = match DeployKey::new(&serving.default_owner, &serving.default_project) {
        Ok(key) => key,
        Err(e) => {
            error!(error = %e, "Invalid default serving scope configured");
            return internal_error();
        }
    };
    resolve(state, &key, relative_path).await
}

/// Resolve a relative path within a project to a stored object.
///
/// A miss on an extensionless path is treated as client-side-routed
/// navigation and falls back exactly once to the project's `index.html`.
/// A miss on an extensioned path is a plain 404.
async fn resolve(state: &AppState, key: &DeployKey, relative_path: &str) -> Response {
    let rel = relative_path.trim_matches('/');

    match state.store.get(&key.object_key(rel)).await {
        Ok(object) => object_response(object),
        Err(StorageError::NotFound(_)) if !rel.is_empty() && !mime::has_extension(rel) => {
            debug!(key = %key, rel, "SPA fallback to index document");
            match state.store.get(&key.object_key("")).await {
                Ok(object) => object_response(object),
                Err(StorageError::NotFound(_) | StorageError::InvalidKey(_)) => not_found(),
                Err(e) => storage_error(e),
            }
        }
        // Malformed paths (empty or dot segments) are client garbage,
        // not server errors.
        Err(StorageError::NotFound(_) | StorageError::InvalidKey(_)) => not_found(),
        Err(e) => storage_error(e),
    }
}

fn object_response(object: common::storage::StoredObject) -> Response {
    match Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, object.content_type)
        .body(Body::from(object.bytes))
    {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Failed to build object response");
            internal_error()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "not found").into_response()
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
}

fn storage_error(e: StorageError) -> Response {
    error!(error = %e, "Storage read failed");
    internal_error()
}
