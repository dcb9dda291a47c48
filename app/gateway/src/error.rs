//! Handler errors and their HTTP rendering.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rcore::ProviderKind;
use serde_json::json;

/// Errors a request handler can return.
///
/// Provider failures are not here: they become provider-shaped bodies.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or incomplete input.
    #[error("{0}")]
    BadRequest(String),
    /// A required setting was never staged.
    #[error("configuration missing: {0}")]
    MissingConfig(&'static str),
    /// The path does not name a provider.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    /// A completion for this provider is already running.
    #[error("a completion for {0} is already in flight")]
    Busy(ProviderKind),
    /// Persistence or task failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Shorthand for [`ApiError::BadRequest`].
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// The status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::MissingConfig(_) => StatusCode::BAD_REQUEST,
            Self::UnknownProvider(_) => StatusCode::NOT_FOUND,
            Self::Busy(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                tracing::error!("internal error: {e:#}");
                "internal error".to_owned()
            }
            other => {
                tracing::debug!(%status, "request rejected: {other}");
                other.to_string()
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
