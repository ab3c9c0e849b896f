//! Unified error handling for storegate.
//!
//! Admin API failures map to a status code, a JSON body and a static metric
//! label. Configuration errors live in [`crate::config`].

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Gate Errors (admin API)
// ============================================================================

/// Errors surfaced by the admin API.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("unknown sales channel: {0}")]
    UnknownChannel(String),

    #[error("missing or invalid admin token")]
    Unauthorized,

    #[error("invalid allow-list entries: {}", .0.join(", "))]
    InvalidAllowList(Vec<String>),
}

impl GateError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownChannel(_) => "unknown_channel",
            Self::Unauthorized => "unauthorized",
            Self::InvalidAllowList(_) => "invalid_allowlist",
        }
    }

    /// HTTP status returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownChannel(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidAllowList(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        crate::metrics::record_admin_error(self.error_code());

        let body = ErrorBody {
            error: self.to_string(),
            code: self.error_code(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type for admin handlers.
pub type GateResult<T> = Result<T, GateError>;
