use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use liquiscope_core::{CoreError, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Failures surfaced by API handlers as `{"error": ...}` bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad query input.
    #[error(transparent)]
    BadRequest(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Core(error) if error.is_cache_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Core(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        } else {
            warn!(%status, error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid listen address '{address}': {source}")]
    InvalidAddress {
        address: String,
        source: std::net::AddrParseError,
    },

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
