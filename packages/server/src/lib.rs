pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Siteforge API",
        version = "1.0.0",
        description = "Best-effort static site deployment service"
    ),
    paths(handlers::deploy::deploy),
    components(schemas(
        handlers::deploy::DeployBody,
        handlers::deploy::DeployResponse,
        error::ErrorBody,
    )),
    tags(
        (name = "Deployments", description = "Source fetch, build, and publish"),
    )
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .merge(routes::legacy_routes())
        .merge(routes::site_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .layer(cors)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allow_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin, "Skipping unparseable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
        .max_age(Duration::from_secs(config.max_age))
}
