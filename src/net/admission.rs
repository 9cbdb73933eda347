//! Request admission control.
//!
//! # Responsibilities
//! - Bound the number of handlers executing at once
//! - Hand out permits that release their slot on drop
//!
//! # Design Decisions
//! - Permits are acquired per request, after routing and after the body is
//!   buffered, so neither the serve loop nor a slow upload holds a slot
//! - Waiting requests queue fairly on the semaphore
//! - A permit moves into the handler task, so a dropped connection does not
//!   free the slot while the handler is still running

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// The limiter was closed and admits nothing further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request limiter closed")]
pub struct AdmissionClosed;

/// Semaphore-backed bound on concurrent handler executions.
#[derive(Debug, Clone)]
pub struct RequestLimiter {
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl RequestLimiter {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> Result<RequestPermit, AdmissionClosed> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| AdmissionClosed)?;
        Ok(RequestPermit { _permit: permit })
    }

    /// Stop admitting; waiters and later callers get [`AdmissionClosed`].
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Requests currently holding a permit.
    pub fn in_flight(&self) -> usize {
        self.max_concurrent.saturating_sub(self.available())
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

/// A slot held for the duration of one handler execution.
#[derive(Debug)]
pub struct RequestPermit {
    _permit: OwnedSemaphorePermit,
}
