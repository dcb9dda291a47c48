//! HTTP routes.

use crate::{aggregate, error::ApiError, project, state::AppState};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use rcore::ProviderKind;

/// Largest accepted request body. Project documents can be whole files.
const BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Resolve a `{provider}` path segment.
pub fn resolve(segment: &str) -> Result<ProviderKind, ApiError> {
    ProviderKind::from_path(segment).ok_or_else(|| ApiError::UnknownProvider(segment.to_owned()))
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(greeting))
        .route("/{provider}", post(aggregate::post))
        .route("/{provider}/batch", post(aggregate::batch))
        .route("/{provider}/clear", get(aggregate::clear))
        .route("/{provider}/project", post(project::post))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

async fn greeting() -> &'static str {
    "relay gateway is running"
}
