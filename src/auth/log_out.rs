//! Log-out route handler that ends the session and expires its cookie.

use axum::{Json, extract::State};
use axum_extra::extract::PrivateCookieJar;
use serde_json::{Value, json};

use crate::auth::{
    SessionStore,
    cookie::{get_session_token, invalidate_session_cookie},
};

/// End the current session, if any, and invalidate the session cookie.
///
/// Logging out without a session also succeeds.
pub async fn post_log_out(
    State(sessions): State<SessionStore>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Json<Value>) {
    if let Some(token) = get_session_token(&jar) {
        sessions.remove(&token);
    }

    (
        invalidate_session_cookie(jar),
        Json(json!({ "status": "logged out" })),
    )
}
