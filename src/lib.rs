//! Media ratings platform API server library.

pub mod auth;
pub mod config;
pub mod controllers;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::{Application, Shutdown};
