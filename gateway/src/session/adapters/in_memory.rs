use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::session::clock::{Clock, ClockRef, SystemClock};
use crate::session::store::{token_hint, Session, SessionError, SessionStore};

/// In-memory implementation of SessionStore.
///
/// Expiry is enforced lazily: reads drop an expired record, and every write
/// first sweeps all expired records. One mutex covers the whole map so a
/// sweep and the insert that triggered it form a single critical section.
#[derive(Debug)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    clock: ClockRef,
}

impl InMemorySessionStore {
    /// Create a store on the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: ClockRef) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn clock(&self) -> ClockRef {
        self.clock.clone()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sweep(sessions: &mut HashMap<String, Session>, now: DateTime<Utc>) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_expired_at(now));
    before - sessions.len()
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn store(&self, session: Session) {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;

        let swept = sweep(&mut sessions, now);
        if swept > 0 {
            debug!(swept, "Swept expired sessions on write");
        }

        debug!(
            token = session.token_hint(),
            user = %session.username,
            expires_at = %session.expires_at,
            "Stored session"
        );
        sessions.insert(session.token.clone(), session);
    }

    async fn lookup(&self, token: &str) -> Result<Session, SessionError> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;

        let session = sessions.get(token).ok_or(SessionError::NotFound)?;
        if session.is_expired_at(now) {
            let expires_at = session.expires_at;
            sessions.remove(token);
            debug!(token = token_hint(token), "Dropped expired session on read");
            return Err(SessionError::Expired(expires_at));
        }

        Ok(session.clone())
    }

    async fn remove(&self, token: &str) {
        let mut sessions = self.sessions.lock().await;
        if sessions.remove(token).is_some() {
            debug!(token = token_hint(token), "Removed session");
        }
    }

    async fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        sweep(&mut sessions, now)
    }

    async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
