//! Media ratings platform API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::listener ──▶ http::server (request ID, tracing)
//!                                            │
//!                                            ▼
//!                                    http::dispatcher ──▶ routing::RouteTable
//!                                            │
//!                                            ▼
//!                                    controllers::users ──▶ auth::AuthService
//!                                            │                 │
//!                                            │                 ├─▶ CredentialRepository
//!                                            │                 └─▶ TokenStore ◀── SessionSweeper
//!                                            ▼
//!     Client Response ◀────────────── JSON reply or error envelope
//! ```

use mrp_server::config;
use mrp_server::lifecycle::{signals, Application, Shutdown};
use mrp_server::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_from_env()?;
    logging::init(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "mrp-server starting");
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        max_concurrent_requests = config.listener.max_concurrent_requests,
        token_ttl_secs = config.auth.token_ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let app = Application::build(config).await?;
    tracing::info!(address = %app.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::forward_to(&trigger).await;
    });

    app.run(&shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
