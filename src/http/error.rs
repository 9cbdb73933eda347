//! API error type and JSON error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::auth::{AuthError, RepositoryError};
use crate::http::response::json_response;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every failure that reaches the wire goes through this type.
///
/// Only the `Display` text and the optional `detail` are sent to clients.
/// `Internal` always renders as `"Server error"`; the dispatcher logs its cause.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No route matched the request.
    #[error("Not Found")]
    RouteNotFound,

    /// Missing, malformed, unknown or expired bearer token.
    #[error("Unauthorized")]
    Unauthenticated,

    /// Request body exceeded `limits.max_body_bytes`.
    #[error("Payload Too Large")]
    PayloadTooLarge,

    /// Error chosen by a handler (400, 403, 404, 409 ...).
    #[error("{message}")]
    Client {
        status: StatusCode,
        message: String,
        detail: Option<String>,
    },

    /// Anything unexpected.
    #[error("Server error")]
    Internal(#[source] BoxError),
}

impl ApiError {
    pub fn client(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Client {
            status,
            message: message.into(),
            detail: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::client(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::client(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::client(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(err: impl Into<BoxError>) -> Self {
        Self::Internal(err.into())
    }

    /// Attach a `detail` field. Ignored for non-client errors.
    pub fn with_detail(self, detail: impl Into<String>) -> Self {
        match self {
            Self::Client {
                status, message, ..
            } => Self::Client {
                status,
                message,
                detail: Some(detail.into()),
            },
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Client { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            Self::Client { detail, .. } => detail.clone(),
            _ => None,
        };

        let body = ErrorBody {
            error: self.to_string(),
            detail,
        };
        json_response(status, &body)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateUsername => Self::client(StatusCode::BAD_REQUEST, err.to_string()),
            AuthError::InvalidCredentials => Self::client(StatusCode::UNAUTHORIZED, err.to_string()),
            AuthError::Unauthenticated => Self::Unauthenticated,
            other => Self::internal(other),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self::internal(err)
    }
}
