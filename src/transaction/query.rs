//! Listing transactions with their resolved categories.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, Period, TransactionType,
    category::{CategoryLabel, JoinedCategory},
    database_id::{CategoryId, TransactionId},
    db::collect_skipping_malformed_rows,
    transaction::Amount,
};

/// A transaction together with the display fields of its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned.
    pub amount: Amount,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: Date,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The stored category reference.
    pub category_id: Option<CategoryId>,
    /// The category name, or "Uncategorized".
    pub category_name: String,
    /// The category color, empty if uncategorized.
    pub category_color: String,
    /// The category icon, empty if uncategorized.
    pub category_icon: String,
}

/// Filters for listing transactions.
///
/// The filters compose: the period selects transactions and the limit is
/// applied after ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only include transactions dated within this month.
    pub period: Option<Period>,
    /// The maximum number of transactions to return.
    pub limit: Option<u32>,
}

/// Get transactions with their categories, most recent first.
///
/// Transactions are sorted by date and then by ID, both descending, so
/// transactions on the same day are listed newest first. Rows that cannot be
/// decoded are skipped.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
pub fn list_transactions(
    filter: TransactionFilter,
    connection: &Connection,
) -> Result<Vec<EnrichedTransaction>, Error> {
    let mut query = String::from(
        "SELECT t.id, t.amount, t.description, t.date, t.type, t.category_id,
            c.id, c.name, c.color, c.icon
        FROM \"transaction\" t
        LEFT JOIN category c ON c.id = t.category_id",
    );
    let mut params = Vec::new();

    if let Some(period) = filter.period {
        let date_range = period.date_range();
        query.push_str(" WHERE t.date BETWEEN ?1 AND ?2");
        params.push(Value::Text(date_range.start().to_string()));
        params.push(Value::Text(date_range.end().to_string()));
    }

    query.push_str(" ORDER BY t.date DESC, t.id DESC");

    if let Some(limit) = filter.limit {
        query.push_str(&format!(" LIMIT ?{}", params.len() + 1));
        params.push(Value::Integer(limit.into()));
    }

    let mut statement = connection.prepare(&query)?;
    let rows = statement.query_map(params_from_iter(params), |row| {
        let label = CategoryLabel::resolve(JoinedCategory::from_row(row, 6)?);

        Ok(EnrichedTransaction {
            id: row.get(0)?,
            amount: row.get(1)?,
            description: row.get(2)?,
            date: row.get(3)?,
            kind: row.get(4)?,
            category_id: row.get(5)?,
            category_name: label.name,
            category_color: label.color,
            category_icon: label.icon,
        })
    })?;

    collect_skipping_malformed_rows(rows, "transaction")
}
