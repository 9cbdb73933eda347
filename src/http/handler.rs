//! The handler contract.
//!
//! A handler receives a [`RequestContext`] and resolves to a [`Reply`] or an
//! [`ApiError`]. Async closures and controller methods bound with
//! [`with_state`] both qualify.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::http::error::ApiError;
use crate::http::request::RequestContext;
use crate::http::response::Reply;
use crate::routing::{RouteError, RouteTable, RouteTableBuilder};

pub type HandlerResult = Result<Reply, ApiError>;

/// Business logic invoked for a matched route.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(ctx))
    }
}

pub type SharedHandler = Arc<dyn Handler>;

/// The frozen route table served by the dispatcher.
pub type HandlerTable = RouteTable<SharedHandler>;

/// Bind a function taking shared state to a handler.
///
/// ```ignore
/// routes.route("GET", "/api/users/{username}/profile", with_state(users, UsersController::profile))?;
/// ```
pub fn with_state<S, F, Fut>(state: Arc<S>, f: F) -> impl Handler
where
    S: Send + Sync + 'static,
    F: Fn(Arc<S>, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    move |ctx: RequestContext| f(Arc::clone(&state), ctx)
}

impl RouteTableBuilder<SharedHandler> {
    /// Register any [`Handler`].
    pub fn route(
        &mut self,
        method: &str,
        pattern: &str,
        handler: impl Handler,
    ) -> Result<&mut Self, RouteError> {
        let handler: SharedHandler = Arc::new(handler);
        self.register(method, pattern, handler)
    }
}
