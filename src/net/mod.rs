//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bound socket, accepted by the axum serve loop)
//!     → HTTP layer routes the request
//!     → admission.rs (per-request permit before the handler runs)
//! ```
//!
//! # Design Decisions
//! - Accepting never blocks on handler work
//! - Concurrency is bounded where handlers run, not at accept
//! - TLS is terminated in front of this process

pub mod admission;
pub mod listener;

pub use admission::{AdmissionClosed, RequestLimiter, RequestPermit};
pub use listener::{bind, ListenerError};
