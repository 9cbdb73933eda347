//! Request context handed to handlers.
//!
//! # Responsibilities
//! - Bundle method, path, headers, query, route params and body
//! - Offer typed accessors (header, query, param, JSON body)
//!
//! # Design Decisions
//! - The body is read in full before the handler runs
//! - Query strings are decoded as `application/x-www-form-urlencoded`
//! - The request ID is assigned by the outermost layer and read here

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method};
use serde::de::DeserializeOwned;

use crate::http::error::ApiError;
use crate::routing::RouteParams;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Everything a handler may look at.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    path: String,
    headers: HeaderMap,
    query: HashMap<String, String>,
    params: RouteParams,
    body: Bytes,
}

impl RequestContext {
    pub fn new(parts: Parts, params: RouteParams, body: Bytes) -> Self {
        let query = parts
            .uri
            .query()
            .map(parse_query)
            .unwrap_or_default();

        Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            headers: parts.headers,
            query,
            params,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text; `None` if absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw `Authorization` header value.
    pub fn authorization(&self) -> Option<&str> {
        self.header(AUTHORIZATION.as_str())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }

    /// Decoded query parameter. Repeated keys keep the last value.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Decoded route placeholder value.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parse the body as JSON. Parse failures become a 400 without echoing
    /// parser internals.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|err| {
            tracing::debug!(error = %err, path = %self.path, "Rejected JSON body");
            ApiError::bad_request("Invalid JSON body")
        })
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde::Deserialize;

    fn context(uri: &str, body: &'static str) -> RequestContext {
        let (parts, _) = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Authorization", "Bearer abc")
            .header(X_REQUEST_ID, "req-1")
            .body(())
            .unwrap()
            .into_parts();
        let params = [("id".to_string(), "42".to_string())].into_iter().collect();
        RequestContext::new(parts, params, Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn test_accessors() {
        let ctx = context("/api/media/42?title=Star+Wars&genre=sci%2Dfi", "");
        assert_eq!(*ctx.method(), Method::POST);
        assert_eq!(ctx.path(), "/api/media/42");
        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.query("title"), Some("Star Wars"));
        assert_eq!(ctx.query("genre"), Some("sci-fi"));
        assert_eq!(ctx.query("missing"), None);
        assert_eq!(ctx.authorization(), Some("Bearer abc"));
        assert_eq!(ctx.request_id(), Some("req-1"));
    }

    #[test]
    fn test_json_body() {
        #[derive(Debug, Deserialize)]
        struct Body {
            username: String,
        }

        let ctx = context("/", r#"{"username":"alice"}"#);
        assert_eq!(ctx.json::<Body>().unwrap().username, "alice");

        let ctx = context("/", "{not json");
        let err = ctx.json::<Body>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON body");
    }
}
