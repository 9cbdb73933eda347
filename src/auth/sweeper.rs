//! Periodic removal of expired sessions.
//!
//! # Responsibilities
//! - Wake up every `auth.sweep_interval_secs`
//! - Purge expired sessions from the token store
//! - Publish the active-session gauge
//! - Exit on the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::auth::token_store::TokenStore;
use crate::observability::metrics;

pub struct SessionSweeper {
    tokens: Arc<TokenStore>,
    interval: Duration,
}

impl SessionSweeper {
    /// `interval` is clamped to at least one second.
    pub fn new(tokens: Arc<TokenStore>, interval: Duration) -> Self {
        Self {
            tokens,
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Session sweeper starting");

        let mut ticker = time::interval(self.interval);
        // The first tick fires immediately; nothing can have expired yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Session sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Purge once and publish the session gauge. Returns the number of
    /// sessions removed.
    pub fn sweep(&self) -> usize {
        let removed = self.tokens.purge_expired();
        let remaining = self.tokens.len();
        metrics::record_active_sessions(remaining);
        if removed > 0 {
            tracing::debug!(removed, remaining, "Expired sessions purged");
        }
        removed
    }
}
