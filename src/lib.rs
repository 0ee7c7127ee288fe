//! Finance Tracker is a web server for tracking personal income and spending.
//!
//! This library provides a JSON API over a ledger of categories and
//! transactions, plus monthly reports computed from that ledger. Access is
//! gated by a single-user session cookie.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use rust_decimal::Decimal;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod database_id;
mod db;
mod endpoints;
mod ledger;
mod logging;
mod period;
mod report;
mod routing;
mod transaction;
mod transaction_type;

pub use app_state::{AppState, create_cookie_key};
pub use auth::{PasswordHash, UserId, ValidatedPassword, set_user_password};
pub use category::{Category, CategoryName, NewCategory, UNCATEGORIZED_LABEL};
pub use database_id::{CategoryId, TransactionId};
pub use db::{initialize as initialize_db, seed_default_categories};
pub use ledger::Ledger;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use period::Period;
pub use report::{CategoryStat, MonthlySummary};
pub use routing::build_router;
pub use transaction::{
    Amount, EnrichedTransaction, Transaction, TransactionData, TransactionFilter,
};
pub use transaction_type::TransactionType;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username or password did not match the registered user.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The request did not carry a valid session cookie.
    #[error("you must log in to access this resource")]
    Unauthorized,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A month filter was not in the `YYYY-MM` format.
    #[error("\"{0}\" is not a valid month, expected the format YYYY-MM")]
    InvalidPeriod(String),

    /// A result limit was not a non-negative integer.
    #[error("\"{0}\" is not a valid limit, expected a non-negative integer")]
    InvalidLimit(String),

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A negative amount was used for a transaction.
    ///
    /// Whether money was earned or spent is given by the transaction type,
    /// so amounts are always non-negative.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(Decimal),

    /// The category ID used for a transaction did not match a category.
    #[error("the category ID {0:?} does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A report total does not fit in a decimal number.
    #[error("the total of the amounts is too large to calculate")]
    AmountOverflow,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::TooWeak(_)
            | Error::InvalidPeriod(_)
            | Error::InvalidLimit(_)
            | Error::EmptyCategoryName
            | Error::NegativeAmount(_)
            | Error::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            Error::NotFound | Error::UpdateMissingTransaction => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::AmountOverflow => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            // Internal details stay in the server logs.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
