//! Route handlers for the public API.
//!
//! # Data Flow
//! ```text
//! dispatcher
//!     → users.rs (register, login, logout, profile)
//!     → health.rs (liveness)
//! ```
//!
//! # Design Decisions
//! - Controllers hold their collaborators behind `Arc` and are bound to
//!   routes with `with_state`
//! - Every route is registered here, in one place, before the table freezes

pub mod health;
pub mod users;

use std::sync::Arc;

use crate::auth::{AuthService, CredentialRepository};
use crate::http::{with_state, HandlerTable, SharedHandler};
use crate::routing::{RouteError, RouteTableBuilder};

pub use users::UsersController;

/// Build the frozen route table for the API.
pub fn routes(
    auth: Arc<AuthService>,
    credentials: Arc<dyn CredentialRepository>,
    case_insensitive_paths: bool,
) -> Result<HandlerTable, RouteError> {
    let users = Arc::new(UsersController::new(auth, credentials));

    let mut builder: RouteTableBuilder<SharedHandler> = RouteTableBuilder::new().case_insensitive_paths(case_insensitive_paths);
    builder
        .route("GET", "/health", health::get_status)?
        .route(
            "POST",
            "/api/users/register",
            with_state(Arc::clone(&users), UsersController::register),
        )?
        .route(
            "POST",
            "/api/users/login",
            with_state(Arc::clone(&users), UsersController::login),
        )?
        .route(
            "POST",
            "/api/users/logout",
            with_state(Arc::clone(&users), UsersController::logout),
        )?
        .route(
            "GET",
            "/api/users/{username}/profile",
            with_state(users, UsersController::profile),
        )?;

    Ok(builder.build())
}
