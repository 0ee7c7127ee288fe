//! Resolves the category shown for a transaction.
//!
//! Transactions are read with a `LEFT JOIN` on the category table. A
//! transaction without a category, or whose category no longer exists, gets
//! the [UNCATEGORIZED_LABEL] instead.

use rusqlite::Row;

use crate::database_id::CategoryId;

/// The name shown for transactions without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The category columns from a left join, present only when a category row matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedCategory {
    /// The ID of the matched category.
    pub id: CategoryId,
    /// The name of the matched category.
    pub name: String,
    /// The color of the matched category.
    pub color: Option<String>,
    /// The icon of the matched category.
    pub icon: Option<String>,
}

impl JoinedCategory {
    /// Read the joined category columns `id, name, color, icon` starting at `offset`.
    ///
    /// Returns `None` if the join found no category, i.e. the category ID
    /// column is NULL. Both a NULL reference and a reference to a deleted
    /// category produce a NULL here, since the join is on the category table.
    pub fn from_row(row: &Row, offset: usize) -> Result<Option<Self>, rusqlite::Error> {
        let Some(id) = row.get::<_, Option<CategoryId>>(offset)? else {
            return Ok(None);
        };

        Ok(Some(Self {
            id,
            name: row.get(offset + 1)?,
            color: row.get(offset + 2)?,
            icon: row.get(offset + 3)?,
        }))
    }
}

/// The category display fields attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLabel {
    /// The category name, or [UNCATEGORIZED_LABEL].
    pub name: String,
    /// The category color, empty for uncategorized transactions.
    pub color: String,
    /// The category icon, empty for uncategorized transactions.
    pub icon: String,
}

impl CategoryLabel {
    /// The label for transactions without a category.
    pub fn uncategorized() -> Self {
        Self {
            name: UNCATEGORIZED_LABEL.to_owned(),
            color: String::new(),
            icon: String::new(),
        }
    }

    /// Use the joined category's display fields, or fall back to [CategoryLabel::uncategorized].
    pub fn resolve(joined: Option<JoinedCategory>) -> Self {
        match joined {
            Some(category) => Self {
                name: category.name,
                color: category.color.unwrap_or_default(),
                icon: category.icon.unwrap_or_default(),
            },
            None => Self::uncategorized(),
        }
    }
}
