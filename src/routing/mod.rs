//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → table.rs (ordered route lookup)
//!     → template.rs (segment match, capture + URL-decode placeholders)
//!     → Return: handler + RouteParams, or no-match
//!
//! Route Compilation (at startup):
//!     register(method, pattern, handler) ...
//!     → Compile templates
//!     → build(): freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod table;
pub mod template;

pub use table::{RouteMatch, RouteParams, RouteTable, RouteTableBuilder};
pub use template::{url_decode, RouteError, RouteTemplate};
