//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, TransactionType,
    database_id::{CategoryId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// A non-negative amount of money.
///
/// Amounts are stored as decimal text so that sums do not pick up binary
/// floating point rounding errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Create an amount.
    ///
    /// # Errors
    /// Returns [Error::NegativeAmount] if `value` is less than zero.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value.is_sign_negative() && !value.is_zero() {
            Err(Error::NegativeAmount(value))
        } else {
            Ok(Self(value))
        }
    }

    /// The amount as a decimal number.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let decimal = match value {
            ValueRef::Text(_) => {
                Decimal::from_str(value.as_str()?).map_err(|error| FromSqlError::Other(Box::new(error)))?
            }
            ValueRef::Integer(integer) => Decimal::from(integer),
            ValueRef::Real(real) => {
                Decimal::try_from(real).map_err(|error| FromSqlError::Other(Box::new(error)))?
            }
            _ => return Err(FromSqlError::InvalidType),
        };

        Amount::new(decimal).map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction.
    pub amount: Amount,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: Date,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
}

/// The user-editable fields of a transaction.
///
/// Used both to create transactions and to replace all fields of an
/// existing transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    /// The amount of money spent or earned.
    pub amount: Amount,
    /// A text description of what the transaction was for.
    #[serde(default, alias = "note")]
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: Date,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The ID of the category the transaction belongs to.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl TransactionData {
    /// Start building an uncategorized expense with no description.
    pub fn build(amount: Amount, date: Date) -> Self {
        Self {
            amount,
            description: None,
            date,
            kind: TransactionType::Expense,
            category_id: None,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Set the transaction type.
    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = kind;
        self
    }

    /// Set the category ID.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    data: TransactionData,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category_id = data.category_id;

    connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, description, date, type, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, amount, description, date, type, category_id",
        )?
        .query_row(
            (
                data.amount,
                data.description,
                data.date,
                data.kind,
                data.category_id,
            ),
            map_transaction_row,
        )
        .map_err(|error| map_write_error(error, category_id))
}

/// Replace every field of the transaction `id` with `data`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction,
/// - [Error::InvalidCategory] if the category ID does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    data: TransactionData,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category_id = data.category_id;

    connection
        .prepare(
            "UPDATE \"transaction\"
             SET amount = ?1, description = ?2, date = ?3, type = ?4, category_id = ?5
             WHERE id = ?6
             RETURNING id, amount, description, date, type, category_id",
        )?
        .query_row(
            (
                data.amount,
                data.description,
                data.date,
                data.kind,
                data.category_id,
                id,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => map_write_error(error, category_id),
        })
}

/// Delete the transaction `id`.
///
/// Deleting a transaction that does not exist is not an error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        tracing::debug!("transaction {id} was already deleted");
    }

    Ok(())
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
#[cfg(test)]
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, amount, description, date, type, category_id FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Create the transaction table in the database.
///
/// Deleting a category sets the category of its transactions to NULL.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                type TEXT NOT NULL,
                category_id INTEGER,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Listing and reports filter on date and order by date then ID.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_id ON \"transaction\"(date, id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        amount: row.get(1)?,
        description: row.get(2)?,
        date: row.get(3)?,
        kind: row.get(4)?,
        category_id: row.get(5)?,
    })
}

fn map_write_error(error: rusqlite::Error, category_id: Option<CategoryId>) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidCategory(category_id),
        error => error.into(),
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error, TransactionType,
        category::{CategoryName, NewCategory, create_category, delete_category},
        db::initialize,
        transaction::{
            Amount, TransactionData, create_transaction, delete_transaction, get_transaction,
            update_transaction,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn amount(value: rust_decimal::Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    fn create_food_category(conn: &Connection) -> i64 {
        create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Food"),
                kind: TransactionType::Expense,
                color: String::new(),
                icon: String::new(),
            },
            conn,
        )
        .unwrap()
        .id
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let category_id = create_food_category(&conn);

        let result = create_transaction(
            TransactionData::build(amount(dec!(12.30)), date!(2025 - 10 - 05))
                .description("Lunch")
                .category_id(Some(category_id)),
            &conn,
        );

        let transaction = result.expect("Could not create transaction");
        assert!(transaction.id > 0);
        assert_eq!(transaction.amount.value(), dec!(12.30));
        assert_eq!(transaction.description.as_deref(), Some("Lunch"));
        assert_eq!(transaction.date, date!(2025 - 10 - 05));
        assert_eq!(transaction.kind, TransactionType::Expense);
        assert_eq!(transaction.category_id, Some(category_id));
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let conn = get_test_connection();
        let category_id = Some(42);

        let result = create_transaction(
            TransactionData::build(amount(dec!(1)), date!(2025 - 10 - 04)).category_id(category_id),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category_id)));
    }

    #[test]
    fn update_replaces_all_fields() {
        let conn = get_test_connection();
        let category_id = create_food_category(&conn);
        let original = create_transaction(
            TransactionData::build(amount(dec!(10)), date!(2024 - 01 - 01))
                .description("Groceries")
                .category_id(Some(category_id)),
            &conn,
        )
        .unwrap();

        let updated = update_transaction(
            original.id,
            TransactionData::build(amount(dec!(2500)), date!(2024 - 02 - 15))
                .kind(TransactionType::Income),
            &conn,
        )
        .expect("Could not update transaction");

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.amount.value(), dec!(2500));
        assert_eq!(updated.description, None);
        assert_eq!(updated.date, date!(2024 - 02 - 15));
        assert_eq!(updated.kind, TransactionType::Income);
        assert_eq!(updated.category_id, None);
        assert_eq!(get_transaction(original.id, &conn), Ok(updated));
    }

    #[test]
    fn update_missing_transaction_fails() {
        let conn = get_test_connection();

        let result = update_transaction(
            999999,
            TransactionData::build(amount(dec!(1)), date!(2024 - 01 - 01)),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn update_fails_on_invalid_category_id() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            TransactionData::build(amount(dec!(1)), date!(2024 - 01 - 01)),
            &conn,
        )
        .unwrap();

        let result = update_transaction(
            transaction.id,
            TransactionData::build(amount(dec!(1)), date!(2024 - 01 - 01)).category_id(Some(7)),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(Some(7))));
    }

    #[test]
    fn delete_succeeds() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            TransactionData::build(amount(dec!(1)), date!(2024 - 01 - 01)),
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, &conn).expect("Could not delete transaction");

        assert_eq!(get_transaction(transaction.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_transaction_is_not_an_error() {
        let conn = get_test_connection();

        assert_eq!(delete_transaction(999999, &conn), Ok(()));
    }

    #[test]
    fn deleting_category_keeps_transactions() {
        let conn = get_test_connection();
        let category_id = create_food_category(&conn);
        let transaction = create_transaction(
            TransactionData::build(amount(dec!(9.99)), date!(2024 - 01 - 01))
                .category_id(Some(category_id)),
            &conn,
        )
        .unwrap();

        delete_category(category_id, &conn).unwrap();

        let got = get_transaction(transaction.id, &conn).expect("Transaction was deleted");
        assert_eq!(got.category_id, None);
        assert_eq!(got.amount, transaction.amount);
    }
}
