use axum::Json;
use axum::extract::State;
use common::DeployKey;
use pipeline::DeploymentRequest;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeployBody {
    /// Git URL of the repository to deploy.
    #[schema(example = "https://github.com/alice/blog.git")]
    pub source_location: String,
    #[serde(default = "default_owner")]
    #[schema(example = "alice")]
    pub owner_id: String,
    #[serde(default = "default_project")]
    #[schema(example = "blog")]
    pub project_id: String,
}

fn default_owner() -> String {
    "anon".into()
}
fn default_project() -> String {
    "demo".into()
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeployResponse {
    #[schema(example = "Deployment complete")]
    pub message: String,
    /// Serving path of the deployed site.
    #[schema(example = "/site/alice/blog/")]
    pub url: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/deploy",
    tag = "Deployments",
    operation_id = "deploy",
    summary = "Deploy a repository as a static site",
    description = "Clones the repository, builds it with a best-effort strategy chain \
        (falling back to a placeholder page when every build fails), and publishes \
        the artifact. The deployment is synchronous; the response arrives when \
        serving is consistent.",
    request_body = DeployBody,
    responses(
        (status = 200, description = "Artifact published and servable", body = DeployResponse),
        (status = 400, description = "Invalid owner or project id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "Fetch, artifact or publish failure (DEPLOY_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, body), fields(owner = %body.owner_id, project = %body.project_id))]
pub async fn deploy(
    State(state): State<AppState>,
    Json(body): Json<DeployBody>,
) -> Result<Json<DeployResponse>, AppError> {
    let key = DeployKey::new(body.owner_id, body.project_id)?;

    let request = DeploymentRequest {
        source_location: body.source_location,
        key: key.clone(),
    };
    let outcome = state.deployer.deploy(&request).await?;

    // A fallback-synthesized artifact still reports success; the degraded
    // flag is logged for operators.
    info!(
        uploaded = outcome.uploaded,
        degraded = outcome.degraded,
        strategy = outcome.strategy,
        "Deploy request finished"
    );

    Ok(Json(DeployResponse {
        message: "Deployment complete".into(),
        url: format!("/site/{}/{}/", key.owner_id(), key.project_id()),
    }))
}
