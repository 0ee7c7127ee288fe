//! Single-user authentication with server-side sessions.
//!
//! Logging in checks the username and password against the user table and
//! starts a session. The session token is kept in a private (encrypted)
//! cookie and [auth_guard] rejects API requests without a live session.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod session;
mod user;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use session::SessionStore;
pub use user::{UserId, create_user_table, get_user_by_username, set_user_password};

#[cfg(test)]
pub use middleware::AuthState;
