//! Maps `SentryError` onto the HTTP status codes the control plane
//! surfaces to its callers (§7: validation and registry errors are
//! client-facing; store/transport/internal errors are the operator's).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use sentrywatch_core::error::SentryError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub struct ApiError(pub SentryError);

impl From<SentryError> for ApiError {
    fn from(e: SentryError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SentryError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            SentryError::Registry(id) => (StatusCode::NOT_FOUND, format!("unknown watch id: {id}")),
            SentryError::Store(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            SentryError::Transport(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            SentryError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
