//! Response construction.
//!
//! # Responsibilities
//! - Serialize handler output to JSON bytes
//! - Set status and `Content-Type: application/json`
//! - Fall back to the fixed 500 envelope if serialization fails
//!
//! # Design Decisions
//! - Bodies are fully buffered; responses are small JSON documents
//! - Serialization happens once, when the reply is built

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Body written when nothing better can be produced.
pub const SERVER_ERROR_BODY: &[u8] = br#"{"error":"Server error"}"#;

const APPLICATION_JSON: &str = "application/json";

/// A handler's successful result: status plus serialized JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    status: StatusCode,
    body: Bytes,
}

impl Reply {
    /// Serialize `body` now. A serialization failure yields the 500 envelope.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(bytes) => Self {
                status,
                body: Bytes::from(bytes),
            },
            Err(err) => {
                tracing::error!(error = %err, "Response serialization failed");
                Self::server_error()
            }
        }
    }

    pub fn ok<T: Serialize + ?Sized>(body: &T) -> Self {
        Self::json(StatusCode::OK, body)
    }

    pub fn created<T: Serialize + ?Sized>(body: &T) -> Self {
        Self::json(StatusCode::CREATED, body)
    }

    fn server_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: Bytes::from_static(SERVER_ERROR_BODY),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        response
    }
}

/// Build a JSON response directly.
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response {
    Reply::json(status, body).into_response()
}
