//! The route handler for log-in requests.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::time::sleep;

use crate::{
    AppState, Error,
    auth::{SessionStore, cookie::set_session_cookie, get_user_by_username},
};

/// How long to wait before rejecting an unknown username.
///
/// Unknown users skip the password check, so the delay keeps them from
/// answering noticeably faster than a wrong password.
const UNKNOWN_USER_DELAY: std::time::Duration = std::time::Duration::from_millis(100);

/// The state needed to perform a log-in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a new session lasts.
    pub cookie_duration: time::Duration,
    /// The database connection for looking up the user.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The active sessions.
    pub sessions: SessionStore,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
            sessions: state.sessions.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent by the client to log in.
#[derive(Debug, Clone, Deserialize)]
pub struct LogInData {
    /// The name of the user.
    pub username: String,
    /// The user's password in plain text.
    pub password: String,
}

/// Handler for log-in requests.
///
/// On success a session is started and its token is set as a private
/// cookie.
///
/// # Errors
/// Returns:
/// - [Error::InvalidCredentials] if the username or password is wrong.
/// - [Error::HashingError] if the password could not be checked.
/// - [Error::SqlError] or [Error::DatabaseLockError] if the user could not be loaded.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Json(credentials): Json<LogInData>,
) -> Result<(PrivateCookieJar, Json<Value>), Error> {
    let user = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        get_user_by_username(credentials.username.trim(), &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::NotFound) => {
            tracing::info!("Log-in attempt for unknown user \"{}\"", credentials.username);
            sleep(UNKNOWN_USER_DELAY).await;
            return Err(Error::InvalidCredentials);
        }
        Err(error) => return Err(error),
    };

    let is_password_valid = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        tracing::info!("Wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = state.sessions.create(user.id, state.cookie_duration);
    let jar = set_session_cookie(jar, &token, state.cookie_duration);
    tracing::info!("User {} logged in", user.id);

    Ok((jar, Json(json!({ "status": "success" }))))
}
