//! Monthly expense breakdown by category.

use std::collections::BTreeMap;

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Period,
    category::{CategoryLabel, JoinedCategory},
    database_id::CategoryId,
    db::collect_skipping_malformed_rows,
    transaction::Amount,
};

/// The expenses for one category and their share of all expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    /// The category name.
    pub name: String,
    /// The category color.
    pub color: String,
    /// The category icon.
    pub icon: String,
    /// The sum of expenses in this category.
    pub amount: Decimal,
    /// The category's share of all expenses in the period, from 0 to 100.
    pub percentage: Decimal,
}

/// An expense and the category it was joined to, if any.
#[derive(Debug, Clone)]
struct ExpenseEntry {
    amount: Amount,
    category: Option<JoinedCategory>,
}

/// Group expenses by category and compute each category's share of the total.
///
/// The total includes uncategorized expenses, but they do not get an entry of
/// their own, so the percentages only add up to 100 when every expense has a
/// category. Entries are ordered by amount, largest first, and categories
/// with the same amount are ordered by ID.
///
/// # Errors
/// Returns [Error::AmountOverflow] if the total does not fit in a [Decimal].
fn break_down_expenses(entries: Vec<ExpenseEntry>) -> Result<Vec<CategoryStat>, Error> {
    let mut total = Decimal::ZERO;
    let mut totals_by_category: BTreeMap<CategoryId, (JoinedCategory, Decimal)> = BTreeMap::new();

    for entry in entries {
        let amount = entry.amount.value();
        total = total.checked_add(amount).ok_or(Error::AmountOverflow)?;

        if let Some(category) = entry.category {
            let (_, category_total) = totals_by_category
                .entry(category.id)
                .or_insert_with(|| (category, Decimal::ZERO));
            *category_total = category_total
                .checked_add(amount)
                .ok_or(Error::AmountOverflow)?;
        }
    }

    let mut stats = totals_by_category
        .into_values()
        .map(|(category, amount)| -> Result<CategoryStat, Error> {
            let label = CategoryLabel::resolve(Some(category));

            Ok(CategoryStat {
                name: label.name,
                color: label.color,
                icon: label.icon,
                amount,
                percentage: percentage_of(amount, total)?,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    // Stable sort keeps the category ID order for equal amounts.
    stats.sort_by(|left, right| right.amount.cmp(&left.amount));

    Ok(stats)
}

/// `part` as a percentage of `total`, or zero if `total` is zero.
///
/// `part` must not be larger than `total`.
fn percentage_of(part: Decimal, total: Decimal) -> Result<Decimal, Error> {
    if total.is_zero() {
        return Ok(Decimal::ZERO);
    }

    // `part / total` is at most one, so dividing first cannot overflow.
    let percentage = match part.checked_mul(Decimal::ONE_HUNDRED) {
        Some(scaled) => scaled.checked_div(total),
        None => part
            .checked_div(total)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED)),
    };

    percentage.ok_or(Error::AmountOverflow)
}

/// Get the expense totals per category for transactions dated in `period`.
///
/// Only expense transactions are counted. Expenses whose category is missing
/// or was deleted are part of the total used for the percentages, but are
/// not listed. Rows that cannot be decoded are skipped.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails, or [Error::AmountOverflow]
/// if the total of the expenses is too large.
pub fn get_category_stats(period: Period, connection: &Connection) -> Result<Vec<CategoryStat>, Error> {
    let date_range = period.date_range();

    let mut statement = connection.prepare(
        "SELECT t.amount, c.id, c.name, c.color, c.icon
        FROM \"transaction\" t
        LEFT JOIN category c ON c.id = t.category_id
        WHERE t.type = 'expense' AND t.date BETWEEN ?1 AND ?2",
    )?;
    let rows = statement.query_map([date_range.start(), date_range.end()], |row| {
        Ok(ExpenseEntry {
            amount: row.get(0)?,
            category: JoinedCategory::from_row(row, 1)?,
        })
    })?;

    let entries = collect_skipping_malformed_rows(rows, "transaction")?;

    break_down_expenses(entries)
}
