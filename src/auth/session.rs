//! In-memory sessions for logged in users.
//!
//! A session is created on log-in and identified by a random token that the
//! client holds in a private cookie. Sessions live in memory only, so
//! restarting the server logs everyone out.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use axum::extract::FromRef;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{AppState, auth::UserId};

#[derive(Debug, Clone, Copy)]
struct Session {
    user_id: UserId,
    expires_at: OffsetDateTime,
}

/// The active sessions, keyed by session token.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl SessionStore {
    /// Create an empty session store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        // Every write leaves the map consistent, so a poisoned lock is still usable.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a session for `user_id` that lasts for `duration`.
    ///
    /// Returns the new session token. Expired sessions are dropped.
    pub fn create(&self, user_id: UserId, duration: Duration) -> String {
        let now = OffsetDateTime::now_utc();
        let token = Uuid::new_v4().to_string();

        let mut sessions = self.lock();
        sessions.retain(|_, session| session.expires_at > now);
        sessions.insert(
            token.clone(),
            Session {
                user_id,
                expires_at: now + duration,
            },
        );

        token
    }

    /// Get the user for `token` if the session exists and has not expired.
    pub fn get(&self, token: &str) -> Option<UserId> {
        let mut sessions = self.lock();
        let session = *sessions.get(token)?;

        if session.expires_at <= OffsetDateTime::now_utc() {
            sessions.remove(token);
            return None;
        }

        Some(session.user_id)
    }

    /// End the session for `token`.
    pub fn remove(&self, token: &str) {
        self.lock().remove(token);
    }
}
