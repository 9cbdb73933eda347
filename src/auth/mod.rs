//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Register:
//!     username, password → credentials.rs (duplicate check)
//!     → password.rs (salt + PBKDF2 on the blocking pool)
//!     → credentials.rs (atomic create)
//!
//! Login:
//!     username, password → credentials.rs (lookup)
//!     → password.rs (constant-time verify)
//!     → token_store.rs (new Session keyed by a random token)
//!
//! Authenticate:
//!     "Bearer <token>" → token_store.rs (lookup + expiry check) → Session
//! ```
//!
//! # Design Decisions
//! - Tokens are pure CSPRNG output and expire
//! - Failures never say which field was wrong
//! - The token store is created at startup and shared by `Arc`, never global

pub mod credentials;
pub mod password;
pub mod service;
pub mod sweeper;
pub mod token_store;

pub use credentials::{
    Credential, CredentialRepository, InMemoryCredentialRepository, NewCredential,
    RepositoryError, UserId,
};
pub use service::{AuthError, AuthService, LoginOutcome, UserIdentity};
pub use sweeper::SessionSweeper;
pub use token_store::{Session, TokenStore};
