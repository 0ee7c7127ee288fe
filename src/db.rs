//! Database schema setup and shared row handling.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, TransactionType,
    auth::create_user_table,
    category::{CategoryName, NewCategory, create_category, create_category_table},
    transaction::create_transaction_table,
};

/// Create the tables for the domain models if they do not exist.
///
/// Also turns on foreign key enforcement for `connection`, which makes
/// deleting a category set the category of its transactions to NULL.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // This pragma is a no-op inside a transaction, so it must come first.
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// The categories available in a fresh ledger.
const DEFAULT_CATEGORIES: [(&str, TransactionType, &str, &str); 6] = [
    ("Salary", TransactionType::Income, "bg-emerald-500", "💰"),
    ("Freelance", TransactionType::Income, "bg-blue-500", "💻"),
    ("Food", TransactionType::Expense, "bg-orange-500", "🍔"),
    ("Transport", TransactionType::Expense, "bg-indigo-500", "🚌"),
    ("Utilities", TransactionType::Expense, "bg-yellow-500", "⚡"),
    ("Entertainment", TransactionType::Expense, "bg-pink-500", "🎬"),
];

/// Add the default categories if there are no categories yet.
///
/// Returns the number of categories that were added.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn seed_default_categories(connection: &Connection) -> Result<usize, Error> {
    let count: u32 = connection.query_row("SELECT COUNT(id) FROM category;", [], |row| {
        row.get(0)
    })?;

    if count > 0 {
        return Ok(0);
    }

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    for (name, kind, color, icon) in DEFAULT_CATEGORIES {
        create_category(
            NewCategory {
                name: CategoryName::new_unchecked(name),
                kind,
                color: color.to_owned(),
                icon: icon.to_owned(),
            },
            &transaction,
        )?;
    }

    transaction.commit()?;
    tracing::info!("Seeded {} default categories", DEFAULT_CATEGORIES.len());

    Ok(DEFAULT_CATEGORIES.len())
}

/// Collect mapped rows, skipping rows whose stored values cannot be decoded.
///
/// A malformed row (e.g., an amount that is not a number) is logged and
/// left out of the results. Any other error aborts the read.
pub(crate) fn collect_skipping_malformed_rows<T>(
    rows: impl Iterator<Item = Result<T, rusqlite::Error>>,
    table: &str,
) -> Result<Vec<T>, Error> {
    let mut collected = Vec::new();

    for row in rows {
        match row {
            Ok(value) => collected.push(value),
            Err(
                error @ (rusqlite::Error::FromSqlConversionFailure(..)
                | rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::IntegralValueOutOfRange(..)),
            ) => {
                tracing::warn!("Skipping malformed {table} row: {error}");
            }
            Err(error) => return Err(error.into()),
        }
    }

    Ok(collected)
}
