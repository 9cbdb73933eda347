//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use mrp_server::auth::TokenStore;
use mrp_server::config::ServerConfig;
use mrp_server::http::{HandlerTable, HttpServer};
use mrp_server::lifecycle::{Application, Shutdown};
use mrp_server::net;

/// A config bound to an ephemeral loopback port with cheap hashing.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.auth.pbkdf2_rounds = 1_000;
    config
}

/// A running server plus the handle that stops it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the serve loop to return.
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.task.await.unwrap();
    }
}

/// Boot the full application.
pub async fn spawn_app(config: ServerConfig) -> TestServer {
    let app = Application::build(config).await.unwrap();
    let addr = app.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = shutdown.clone();

    let task = tokio::spawn(async move {
        app.run(&handle).await.unwrap();
    });

    TestServer {
        addr,
        shutdown,
        task,
    }
}

/// Boot a bare server around a custom route table.
pub async fn spawn_routes(config: ServerConfig, routes: HandlerTable) -> TestServer {
    let listener = net::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, routes, Arc::new(TokenStore::new()));
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    let task = tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    TestServer {
        addr,
        shutdown,
        task,
    }
}
