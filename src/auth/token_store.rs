//! In-memory session store.
//!
//! Maps opaque bearer tokens to [`Session`]s. Every operation is a single
//! call on a sharded concurrent map, so callers never take a lock themselves
//! and operations on the same token are linearizable.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::Serialize;

use crate::auth::credentials::UserId;

/// Seconds since the Unix epoch.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Metadata for one logged-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
    /// Creation timestamp (seconds since epoch).
    pub created_at: u64,
    /// Expiry timestamp (seconds since epoch).
    pub expires_at: u64,
}

impl Session {
    /// New session starting now and lasting `ttl`.
    pub fn new(token: String, user_id: UserId, username: String, ttl: Duration) -> Self {
        let created_at = now_secs();
        Self {
            token,
            user_id,
            username,
            created_at,
            expires_at: created_at.saturating_add(ttl.as_secs()),
        }
    }

    /// Check if the session has not expired yet.
    pub fn is_active(&self) -> bool {
        self.is_active_at(now_secs())
    }

    pub fn is_active_at(&self, now: u64) -> bool {
        self.expires_at > now
    }
}

/// Concurrent token → session map.
#[derive(Debug, Default)]
pub struct TokenStore {
    inner: DashMap<String, Session>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the session for `token`.
    pub fn add(&self, token: impl Into<String>, session: Session) {
        self.inner.insert(token.into(), session);
    }

    /// Copy of the session for `token`, expired or not.
    pub fn try_get(&self, token: &str) -> Option<Session> {
        self.inner.get(token).map(|r| r.value().clone())
    }

    /// Remove `token`, returning its session if it was present.
    pub fn remove(&self, token: &str) -> Option<Session> {
        self.inner.remove(token).map(|(_, session)| session)
    }

    /// Remove `token` only if its session has expired.
    pub fn remove_if_expired(&self, token: &str) -> bool {
        self.inner
            .remove_if(token, |_, session| !session.is_active())
            .is_some()
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = now_secs();
        let before = self.inner.len();
        self.inner.retain(|_, session| session.is_active_at(now));
        before.saturating_sub(self.inner.len())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
