//! Credential records and the repository contract.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{self, BoxFuture};
use serde::{Deserialize, Serialize};

use crate::auth::password::{KEY_LEN, SALT_LEN};

/// Identifier assigned to a user by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: UserId,
    pub username: String,
    pub salt: [u8; SALT_LEN],
    pub key: [u8; KEY_LEN],
}

// Salt and key stay out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// A credential before the repository has assigned an id.
#[derive(Clone)]
pub struct NewCredential {
    pub username: String,
    pub salt: [u8; SALT_LEN],
    pub key: [u8; KEY_LEN],
}

/// Failure reported by a credential repository.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Another credential already uses this username (case-insensitively).
    #[error("username `{0}` already exists")]
    Duplicate(String),
    /// Backend failure; the message is for logs only.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for user credentials.
///
/// Username lookups are case-insensitive. `create` must reject duplicates
/// atomically so concurrent registrations cannot both succeed.
pub trait CredentialRepository: Send + Sync + 'static {
    fn get_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, Result<Option<Credential>, RepositoryError>>;

    fn create(&self, credential: NewCredential) -> BoxFuture<'_, Result<UserId, RepositoryError>>;
}

/// Process-local repository backed by a concurrent map.
#[derive(Debug)]
pub struct InMemoryCredentialRepository {
    by_username: DashMap<String, Credential>,
    next_id: AtomicU64,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self {
            by_username: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.by_username.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_username.is_empty()
    }

    fn key(username: &str) -> String {
        username.to_lowercase()
    }
}

impl Default for InMemoryCredentialRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialRepository for InMemoryCredentialRepository {
    fn get_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, Result<Option<Credential>, RepositoryError>> {
        let found = self
            .by_username
            .get(&Self::key(username))
            .map(|entry| entry.value().clone());
        Box::pin(future::ready(Ok(found)))
    }

    fn create(&self, credential: NewCredential) -> BoxFuture<'_, Result<UserId, RepositoryError>> {
        let result = match self.by_username.entry(Self::key(&credential.username)) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate(credential.username)),
            Entry::Vacant(slot) => {
                let id = UserId(self.next_id.fetch_add(1, Ordering::Relaxed));
                slot.insert(Credential {
                    id,
                    username: credential.username,
                    salt: credential.salt,
                    key: credential.key,
                });
                Ok(id)
            }
        };
        Box::pin(future::ready(result))
    }
}
