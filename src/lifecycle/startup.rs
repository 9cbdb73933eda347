//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Register every route before the table freezes
//! - Bind the listener last, so traffic arrives only when ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Config loading and logging setup stay in `main`, so tests can build an
//!   [`Application`] from an in-memory config

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::auth::{AuthService, CredentialRepository, InMemoryCredentialRepository, TokenStore};
use crate::config::ServerConfig;
use crate::controllers;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::net::{self, ListenerError};
use crate::routing::RouteError;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("route registration failed: {0}")]
    Routes(#[from] RouteError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully wired server, bound and ready to run.
pub struct Application {
    server: HttpServer,
    listener: TcpListener,
    auth: Arc<AuthService>,
}

impl Application {
    /// Wire up the in-memory credential store and bind the listener.
    pub async fn build(config: ServerConfig) -> Result<Self, StartupError> {
        let credentials: Arc<dyn CredentialRepository> = Arc::new(InMemoryCredentialRepository::new());
        Self::build_with(config, credentials).await
    }

    /// Wire up with a caller-supplied credential repository.
    pub async fn build_with(
        config: ServerConfig,
        credentials: Arc<dyn CredentialRepository>,
    ) -> Result<Self, StartupError> {
        let tokens = Arc::new(TokenStore::new());
        let auth = Arc::new(AuthService::new(
            Arc::clone(&credentials),
            Arc::clone(&tokens),
            &config.auth,
        ));

        let routes = controllers::routes(
            Arc::clone(&auth),
            credentials,
            config.routing.case_insensitive_paths,
        )?;
        tracing::info!(routes = routes.len(), "Route table frozen");

        let listener = net::bind(&config.listener).await?;
        let server = HttpServer::new(config, routes, tokens);

        Ok(Self {
            server,
            listener,
            auth,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    pub fn auth(&self) -> &Arc<AuthService> {
        &self.auth
    }

    /// Serve until `shutdown` is triggered.
    pub async fn run(self, shutdown: &Shutdown) -> Result<(), StartupError> {
        self.server.run(self.listener, shutdown.subscribe()).await?;
        Ok(())
    }
}
