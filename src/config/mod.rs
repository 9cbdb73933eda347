//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! MRP_CONFIG file (TOML, optional)
//!     → loader.rs (parse & deserialize, PORT override)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → handed to each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    AuthConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig, RoutingConfig,
    ServerConfig,
};
pub use validation::ValidationError;
