use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Structured error response returned by JSON API endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `NOT_FOUND`, `DEPLOY_FAILED`, `INTERNAL_ERROR`.
    #[schema(example = "DEPLOY_FAILED")]
    pub code: &'static str,
    /// Human-readable error description. Deliberately terse: internal
    /// detail is logged server-side, never returned.
    #[schema(example = "Deployment failed")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    /// A deployment aborted on a terminal pipeline error. Contains the
    /// internal detail for logging only.
    DeployFailed(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::DeployFailed(detail) => {
                tracing::error!("Deployment failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "DEPLOY_FAILED",
                        message: "Deployment failed".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<common::KeyError> for AppError {
    fn from(err: common::KeyError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<pipeline::PipelineError> for AppError {
    fn from(err: pipeline::PipelineError) -> Self {
        AppError::DeployFailed(err.to_string())
    }
}
