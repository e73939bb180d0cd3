use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Why a token did not resolve to a live session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Token never stored or already removed
    #[error("Session not found")]
    NotFound,
    /// Token was stored but its expiry has passed
    #[error("Session expired at {0}")]
    Expired(DateTime<Utc>),
}

/// A gateway session bound to a Service Layer session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Opaque bearer token handed to the client
    pub token: String,
    /// `SessionId` issued by the Service Layer, sent upstream as the `B1SESSION` cookie
    pub upstream_session_id: String,
    pub username: String,
    pub environment: String,
    pub upstream_version: String,
    pub timeout_minutes: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session that expires `timeout_minutes` after `now`.
    ///
    /// A timeout past chrono's representable range saturates to the latest instant.
    pub fn new(
        token: String,
        upstream_session_id: String,
        username: String,
        environment: String,
        upstream_version: String,
        timeout_minutes: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let timeout_minutes = timeout_minutes.max(0);
        let expires_at = Duration::try_minutes(timeout_minutes)
            .and_then(|timeout| now.checked_add_signed(timeout))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            token,
            upstream_session_id,
            username,
            environment,
            upstream_version,
            timeout_minutes,
            created_at: now,
            expires_at,
        }
    }

    /// A session is live strictly before its expiry instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whole minutes left before expiry, never negative
    pub fn minutes_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_minutes().max(0)
    }

    /// Short token prefix, safe to put in logs
    pub fn token_hint(&self) -> &str {
        token_hint(&self.token)
    }
}

pub(crate) fn token_hint(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(8)
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    &token[..end]
}

/// Trait defining the interface for session stores.
///
/// None of the operations fail: a missing or expired session is an ordinary
/// outcome reported through the return value.
#[async_trait]
pub trait SessionStore: Send + Sync + Debug {
    /// Insert or replace the record for `session.token`, sweeping expired records first
    async fn store(&self, session: Session);

    /// Live session for `token`. An expired record is deleted and reported as not found.
    async fn get(&self, token: &str) -> Option<Session> {
        self.lookup(token).await.ok()
    }

    /// Like [`SessionStore::get`] but tells "never existed" apart from "expired"
    async fn lookup(&self, token: &str) -> Result<Session, SessionError>;

    /// Delete the record for `token`; absent tokens are a no-op
    async fn remove(&self, token: &str);

    /// Delete every expired record, returning how many were removed
    async fn sweep_expired(&self) -> usize;

    /// Number of tracked records, including expired ones not yet swept
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Type alias for Arc-wrapped SessionStore trait objects
pub type SessionStoreRef = Arc<dyn SessionStore>;
