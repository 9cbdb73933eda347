//! Registration, login and bearer-token authentication.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;

use crate::auth::credentials::{CredentialRepository, NewCredential, RepositoryError, UserId};
use crate::auth::password::{self, KEY_LEN, SALT_LEN};
use crate::auth::token_store::{Session, TokenStore};
use crate::config::AuthConfig;
use crate::observability::metrics;

/// Number of random bytes in a bearer token.
pub const TOKEN_BYTES: usize = 32;

/// Authentication failures.
///
/// The `Display` text of the first three variants is safe to send to clients.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Unauthorized")]
    Unauthenticated,
    #[error("credential repository failed: {0}")]
    Repository(RepositoryError),
    #[error("password hashing task failed: {0}")]
    Hashing(#[from] tokio::task::JoinError),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(_) => AuthError::DuplicateUsername,
            other => AuthError::Repository(other),
        }
    }
}

/// Public identity of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub username: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserIdentity,
}

/// Issues and checks session tokens on top of a credential repository.
pub struct AuthService {
    credentials: Arc<dyn CredentialRepository>,
    tokens: Arc<TokenStore>,
    token_ttl: Duration,
    rounds: u32,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        tokens: Arc<TokenStore>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            credentials,
            tokens,
            token_ttl: Duration::from_secs(config.token_ttl_secs),
            rounds: config.pbkdf2_rounds,
        }
    }

    /// The session store this service issues into.
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Create a credential for `username`. The caller logs in separately.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserId, AuthError> {
        if self.credentials.get_by_username(username).await?.is_some() {
            tracing::debug!(username = %username, "Registration rejected: duplicate username");
            return Err(AuthError::DuplicateUsername);
        }

        let salt = password::generate_salt();
        let key = self.derive(password, salt).await?;

        let id = self
            .credentials
            .create(NewCredential {
                username: username.to_string(),
                salt,
                key,
            })
            .await?;

        tracing::info!(user_id = %id, username = %username, "User registered");
        Ok(id)
    }

    /// Verify the password and open a new session.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let Some(credential) = self.credentials.get_by_username(username).await? else {
            // Same hashing work for unknown users so timing does not reveal them.
            let _ = self.derive(password, [0u8; SALT_LEN]).await?;
            metrics::record_login("invalid");
            return Err(AuthError::InvalidCredentials);
        };

        let rounds = self.rounds;
        let candidate = password.to_owned();
        let stored = credential.clone();
        let valid = tokio::task::spawn_blocking(move || {
            password::verify(&candidate, &stored.salt, &stored.key, rounds)
        })
        .await?;

        if !valid {
            tracing::debug!(username = %username, "Login rejected");
            metrics::record_login("invalid");
            return Err(AuthError::InvalidCredentials);
        }

        let token = mint_token();
        let session = Session::new(
            token.clone(),
            credential.id,
            credential.username.clone(),
            self.token_ttl,
        );
        self.tokens.add(token.clone(), session);

        tracing::info!(user_id = %credential.id, "Session opened");
        metrics::record_login("success");

        Ok(LoginOutcome {
            token,
            user: UserIdentity {
                id: credential.id,
                username: credential.username,
            },
        })
    }

    /// Resolve an `Authorization` header value to a live session.
    ///
    /// Absent, blank or malformed headers, unknown tokens and expired
    /// sessions all yield [`AuthError::Unauthenticated`].
    pub fn try_authenticate(&self, header: Option<&str>) -> Result<Session, AuthError> {
        let token = header
            .filter(|h| !h.trim().is_empty())
            .and_then(|h| h.split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
            .map(|(_, token)| token)
            .ok_or(AuthError::Unauthenticated)?;

        let session = self
            .tokens
            .try_get(token)
            .ok_or(AuthError::Unauthenticated)?;

        if !session.is_active() {
            self.tokens.remove_if_expired(token);
            tracing::debug!(user_id = %session.user_id, "Expired session rejected");
            return Err(AuthError::Unauthenticated);
        }

        Ok(session)
    }

    /// End the session for `token`. Returns false if it was not active.
    pub fn logout(&self, token: &str) -> bool {
        match self.tokens.remove(token) {
            Some(session) => {
                tracing::info!(user_id = %session.user_id, "Session closed");
                true
            }
            None => false,
        }
    }

    async fn derive(&self, secret: &str, salt: [u8; SALT_LEN]) -> Result<[u8; KEY_LEN], AuthError> {
        let rounds = self.rounds;
        let secret = secret.to_owned();
        let key = tokio::task::spawn_blocking(move || password::derive_key(&secret, &salt, rounds)).await?;
        Ok(key)
    }
}

/// Opaque token built only from CSPRNG output.
fn mint_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
