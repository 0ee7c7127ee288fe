//! Monthly income, expense and balance totals.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Period, TransactionType, db::collect_skipping_malformed_rows, transaction::Amount,
};

/// The income and expense totals for a month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// The sum of all income transactions.
    pub income: Decimal,
    /// The sum of all expense transactions.
    pub expense: Decimal,
    /// Income minus expenses, negative if more was spent than earned.
    pub balance: Decimal,
}

/// Sum amounts into income and expense totals by transaction type.
///
/// # Errors
/// Returns [Error::AmountOverflow] if a total does not fit in a [Decimal].
fn summarize(
    entries: impl IntoIterator<Item = (TransactionType, Amount)>,
) -> Result<MonthlySummary, Error> {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;

    for (kind, amount) in entries {
        let total = match kind {
            TransactionType::Income => &mut income,
            TransactionType::Expense => &mut expense,
        };
        *total = total
            .checked_add(amount.value())
            .ok_or(Error::AmountOverflow)?;
    }

    Ok(MonthlySummary {
        income,
        expense,
        balance: income.checked_sub(expense).ok_or(Error::AmountOverflow)?,
    })
}

/// Get the income, expense and balance totals for transactions dated in `period`.
///
/// Only the transaction type decides whether an amount counts as income or
/// expense, the type of its category is ignored. Transactions without a
/// category are included. Rows that cannot be decoded are skipped.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails, or [Error::AmountOverflow]
/// if a total is too large.
pub fn get_monthly_summary(period: Period, connection: &Connection) -> Result<MonthlySummary, Error> {
    let date_range = period.date_range();

    let mut statement = connection.prepare(
        "SELECT type, amount FROM \"transaction\" WHERE date BETWEEN ?1 AND ?2",
    )?;
    let rows = statement.query_map([date_range.start(), date_range.end()], |row| {
        Ok((
            row.get::<_, TransactionType>(0)?,
            row.get::<_, Amount>(1)?,
        ))
    })?;

    let entries = collect_skipping_malformed_rows(rows, "transaction")?;

    summarize(entries)
}


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{Date, Month, macros::date};

    use crate::{
        Period, TransactionType,
        category::{CategoryName, NewCategory, create_category},
        db::initialize,
        transaction::{Amount, TransactionData, create_transaction},
    };

    use super::{MonthlySummary, get_monthly_summary};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn create(amount: Decimal, date: Date, kind: TransactionType, conn: &Connection) {
        create_transaction(
            TransactionData::build(Amount::new(amount).unwrap(), date).kind(kind),
            conn,
        )
        .unwrap();
    }

    const MARCH: Period = Period::new(2024, Month::March);

    #[test]
    fn period_without_transactions_is_zero() {
        let conn = get_test_connection();
        create(dec!(10), date!(2024 - 02 - 01), TransactionType::Income, &conn);

        let summary = get_monthly_summary(MARCH, &conn).unwrap();

        assert_eq!(summary, MonthlySummary::default());
    }

    #[test]
    fn sums_only_transactions_in_period() {
        let conn = get_test_connection();
        create(dec!(500), date!(2024 - 03 - 01), TransactionType::Income, &conn);
        create(dec!(300), date!(2024 - 03 - 31), TransactionType::Expense, &conn);
        create(dec!(1000), date!(2024 - 04 - 01), TransactionType::Expense, &conn);
        create(dec!(1000), date!(2024 - 02 - 29), TransactionType::Income, &conn);

        let summary = get_monthly_summary(MARCH, &conn).unwrap();

        assert_eq!(
            summary,
            MonthlySummary {
                income: dec!(500),
                expense: dec!(300),
                balance: dec!(200),
            }
        );
    }

    #[test]
    fn ignores_category_type() {
        let conn = get_test_connection();
        let salary = create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Salary"),
                kind: TransactionType::Income,
                color: String::new(),
                icon: String::new(),
            },
            &conn,
        )
        .unwrap();
        create_transaction(
            TransactionData::build(Amount::new(dec!(42)).unwrap(), date!(2024 - 03 - 02))
                .kind(TransactionType::Expense)
                .category_id(Some(salary.id)),
            &conn,
        )
        .unwrap();

        let summary = get_monthly_summary(MARCH, &conn).unwrap();

        assert_eq!(summary.income, Decimal::ZERO);
        assert_eq!(summary.expense, dec!(42));
    }

    #[test]
    fn skips_malformed_amounts() {
        let conn = get_test_connection();
        create(dec!(20), date!(2024 - 03 - 02), TransactionType::Expense, &conn);
        conn.execute(
            "INSERT INTO \"transaction\" (amount, date, type) VALUES ('n/a', '2024-03-03', 'expense')",
            (),
        )
        .unwrap();

        let summary = get_monthly_summary(MARCH, &conn).unwrap();

        assert_eq!(summary.expense, dec!(20));
    }
}
