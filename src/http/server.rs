//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all dispatch handler
//! - Wire up middleware (request ID, tracing)
//! - Start the session sweeper alongside the server
//! - Serve until the shutdown signal fires, then drain
//!
//! # Design Decisions
//! - Axum only owns the transport; routing is done by our own table so
//!   the route semantics do not depend on Axum's matcher
//! - Request IDs are generated when absent and echoed on the response

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{SessionSweeper, TokenStore};
use crate::config::ServerConfig;
use crate::http::dispatcher::{dispatch, AppState};
use crate::http::handler::HandlerTable;
use crate::net::RequestLimiter;

/// HTTP server for the ratings API.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    tokens: Arc<TokenStore>,
    limiter: RequestLimiter,
}

impl HttpServer {
    /// Create a server that dispatches through `routes`.
    pub fn new(config: ServerConfig, routes: HandlerTable, tokens: Arc<TokenStore>) -> Self {
        let limiter = RequestLimiter::new(config.listener.max_concurrent_requests);
        let state = AppState {
            routes: Arc::new(routes),
            limiter: limiter.clone(),
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(state);
        Self {
            router,
            config,
            tokens,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_concurrent_requests = self.config.listener.max_concurrent_requests,
            "HTTP server starting"
        );

        let sweeper = SessionSweeper::new(
            Arc::clone(&self.tokens),
            Duration::from_secs(self.config.auth.sweep_interval_secs),
        );
        let sweeper_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            sweeper.run(sweeper_shutdown).await;
        });

        let limiter = self.limiter.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await?;

        limiter.close();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The admission limiter shared with the dispatcher.
    pub fn limiter(&self) -> &RequestLimiter {
        &self.limiter
    }
}
