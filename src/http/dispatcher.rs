//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve each request against the route table
//! - Buffer the body, then admit it through the request limiter
//! - Run the handler in its own task
//! - Turn every outcome, including panics, into a JSON response

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;

use crate::http::error::ApiError;
use crate::http::handler::{HandlerTable, SharedHandler};
use crate::http::request::{RequestContext, X_REQUEST_ID};
use crate::net::RequestLimiter;
use crate::observability::metrics;
use crate::routing::RouteParams;

/// State shared by every dispatch.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<HandlerTable>,
    pub limiter: RequestLimiter,
    pub max_body_bytes: usize,
}

/// Catch-all handler: routes, runs and answers every request.
pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Dispatching request"
    );

    // 1. Match Route
    let Some(route) = state.routes.match_route(method.as_str(), &path) else {
        tracing::debug!(request_id = %request_id, path = %path, "No route matched");
        metrics::record_request(method.as_str(), "none", 404, start);
        return ApiError::RouteNotFound.into_response();
    };
    let pattern = route.template().pattern().to_string();
    let handler = Arc::clone(route.handler());
    let params = route.into_params();

    let response = match run(&state, handler, params, request).await {
        Ok(response) => response,
        Err(err) => {
            if let ApiError::Internal(cause) = &err {
                tracing::error!(request_id = %request_id, route = %pattern, error = %cause, "Dispatch failed");
            }
            err.into_response()
        }
    };

    metrics::record_request(method.as_str(), &pattern, response.status().as_u16(), start);
    response
}

async fn run(
    state: &AppState,
    handler: SharedHandler,
    params: RouteParams,
    request: Request<Body>,
) -> Result<Response, ApiError> {
    // 2. Buffer Request Body
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|err| {
            let err = err.into_inner();
            if err.is::<LengthLimitError>() {
                ApiError::PayloadTooLarge
            } else {
                tracing::debug!(error = %err, "Failed to read request body");
                ApiError::bad_request("Unreadable request body")
            }
        })?;

    // 3. Admission
    let permit = state.limiter.acquire().await.map_err(ApiError::internal)?;

    // 4. Execute
    let ctx = RequestContext::new(parts, params, body);
    let outcome = tokio::spawn(async move {
        let _permit = permit;
        handler.call(ctx).await
    })
    .await;

    match outcome {
        Ok(Ok(reply)) => Ok(reply.into_response()),
        Ok(Err(err)) => Err(err),
        Err(join_err) => Err(ApiError::internal(join_err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::Reply;
    use crate::routing::RouteTableBuilder;
    use axum::http::StatusCode;

    fn state(max_body_bytes: usize) -> AppState {
        let mut routes: RouteTableBuilder<SharedHandler> = RouteTableBuilder::new();
        routes
            .route("GET", "/api/media/{id}", |ctx: RequestContext| async move {
                Ok::<_, ApiError>(Reply::ok(&serde_json::json!({ "id": ctx.param("id") })))
            })
            .unwrap()
            .route("POST", "/echo", |ctx: RequestContext| async move {
                Ok::<_, ApiError>(Reply::ok(&serde_json::json!({ "len": ctx.body().len() })))
            })
            .unwrap()
            .route("GET", "/forbidden", |_ctx: RequestContext| async move {
                Err::<Reply, _>(ApiError::forbidden("forbidden"))
            })
            .unwrap()
            .route("GET", "/panic", |_ctx: RequestContext| async move {
                if true {
                    panic!("handler bug");
                }
                Ok::<_, ApiError>(Reply::ok(&()))
            })
            .unwrap();

        AppState {
            routes: Arc::new(routes.build()),
            limiter: RequestLimiter::new(4),
            max_body_bytes,
        }
    }

    async fn send(state: AppState, method: &str, uri: &str, body: &'static str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body))
            .unwrap();
        let response = dispatch(State(state), request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_routes_with_params() {
        let (status, body) = send(state(1024), "get", "/api/media/a%20b", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"id": "a b"}));
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, body) = send(state(1024), "GET", "/nowhere", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"error": "Not Found"}));
    }

    #[tokio::test]
    async fn test_handler_error_envelope() {
        let (status, body) = send(state(1024), "GET", "/forbidden", "").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, serde_json::json!({"error": "forbidden"}));
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        let state = state(1024);
        let limiter = state.limiter.clone();
        let (status, body) = send(state, "GET", "/panic", "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "Server error"}));
        assert_eq!(limiter.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_stalled_body_does_not_hold_a_permit() {
        let mut state = state(1024);
        state.limiter = RequestLimiter::new(1);
        let limiter = state.limiter.clone();

        let stalled = Request::builder()
            .method("POST")
            .uri("/echo")
            .body(Body::from_stream(futures_util::stream::pending::<
                Result<axum::body::Bytes, std::io::Error>,
            >()))
            .unwrap();
        let upload = tokio::spawn(dispatch(State(state.clone()), stalled));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(limiter.in_flight(), 0);

        let (status, _) = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            send(state, "GET", "/api/media/1", ""),
        )
        .await
        .expect("request starved by a stalled upload");
        assert_eq!(status, StatusCode::OK);
        upload.abort();
    }

    #[tokio::test]
    async fn test_body_limit() {
        let (status, body) = send(state(4), "POST", "/echo", "abc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"len": 3}));

        let (status, body) = send(state(4), "POST", "/echo", "too long").await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, serde_json::json!({"error": "Payload Too Large"}));
    }
}
