//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryName, NewCategory},
    database_id::CategoryId,
    db::collect_skipping_malformed_rows,
};

/// Create a category and return it with its generated ID.
///
/// New categories have no transactions, so the transaction count is zero.
pub fn create_category(category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (name, type, color, icon) VALUES (?1, ?2, ?3, ?4);",
        (
            category.name.as_ref(),
            category.kind,
            &category.color,
            &category.icon,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name: category.name,
        kind: category.kind,
        color: category.color,
        icon: category.icon,
        transaction_count: 0,
    })
}

/// Retrieve all categories ordered alphabetically by name, with the number
/// of transactions linked to each.
///
/// Rows that cannot be decoded are skipped.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    let mut statement = connection.prepare(
        "SELECT c.id, c.name, c.type, c.color, c.icon, COUNT(t.id) AS transaction_count
        FROM category c
        LEFT JOIN \"transaction\" t ON t.category_id = c.id
        GROUP BY c.id
        ORDER BY c.name ASC, c.id ASC;",
    )?;

    collect_skipping_malformed_rows(statement.query_map([], map_row)?, "category")
}

/// Delete a category by ID.
///
/// Deleting a category that does not exist is not an error. Transactions
/// linked to the category are kept and their category reference is set to NULL.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        tracing::debug!("category {category_id} was already deleted");
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT '',
            icon TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);

    Ok(Category {
        id,
        name,
        kind: row.get(2)?,
        color: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        icon: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        transaction_count: row.get(5)?,
    })
}
