//! The user table and the queries for looking up the user who can log in.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// Keeps user IDs apart from category and transaction IDs at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The user ID as a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user who can log in to the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The name the user logs in with.
    pub username: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
/// Returns an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Set the password of the user called `username`, creating the user if needed.
///
/// # Errors
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn set_user_password(
    username: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let id = connection.query_row(
        "INSERT INTO user (username, password) VALUES (?1, ?2)
        ON CONFLICT(username) DO UPDATE SET password = excluded.password
        RETURNING id",
        (username, password_hash.as_ref()),
        |row| row.get(0),
    )?;

    Ok(User {
        id: UserId::new(id),
        username: username.to_owned(),
        password_hash,
    })
}

/// Get the user called `username`.
///
/// # Errors
/// Returns:
/// - [Error::NotFound] if there is no user called `username`.
/// - [Error::SqlError] if there was an error trying to access the database.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, password FROM user WHERE username = :username")?
        .query_row(&[(":username", username)], |row| {
            let raw_password_hash: String = row.get(2)?;

            Ok(User {
                id: UserId::new(row.get(0)?),
                username: row.get(1)?,
                password_hash: PasswordHash::new_unchecked(&raw_password_hash),
            })
        })
        .map_err(|error| error.into())
}
