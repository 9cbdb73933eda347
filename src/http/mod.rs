//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → dispatcher.rs (match route, admit, buffer body)
//!     → handler.rs (business logic on a RequestContext)
//!     → response.rs / error.rs (JSON body or error envelope)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::{dispatch, AppState};
pub use error::{ApiError, ErrorBody};
pub use handler::{with_state, Handler, HandlerResult, HandlerTable, SharedHandler};
pub use request::{RequestContext, X_REQUEST_ID};
pub use response::{json_response, Reply};
pub use server::HttpServer;
