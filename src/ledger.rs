//! The query façade over the ledger of categories and transactions.
//!
//! [Ledger] is the boundary used by the HTTP handlers. Each method locks the
//! shared database connection for the duration of one operation and
//! dispatches to the category, transaction, and report queries.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    AppState, Error, Period,
    category::{self, Category, NewCategory},
    database_id::{CategoryId, TransactionId},
    report::{self, CategoryStat, MonthlySummary},
    transaction::{self, EnrichedTransaction, Transaction, TransactionData, TransactionFilter},
};

/// Access to the categories, transactions and reports in the database.
#[derive(Debug, Clone)]
pub struct Ledger {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for Ledger {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.db_connection.clone())
    }
}

impl Ledger {
    /// Create a ledger over an initialized database connection.
    pub fn new(db_connection: Arc<Mutex<Connection>>) -> Self {
        Self { db_connection }
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }

    /// All categories, ordered by name, with their transaction counts.
    pub fn list_categories(&self) -> Result<Vec<Category>, Error> {
        let connection = self.connection()?;
        category::get_all_categories(&connection)
    }

    /// Create a category.
    pub fn create_category(&self, new_category: NewCategory) -> Result<Category, Error> {
        let connection = self.connection()?;
        category::create_category(new_category, &connection)
    }

    /// Delete a category, keeping its transactions.
    pub fn delete_category(&self, id: CategoryId) -> Result<(), Error> {
        let connection = self.connection()?;
        category::delete_category(id, &connection)
    }

    /// Transactions matching `filter` with their categories, most recent first.
    pub fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<EnrichedTransaction>, Error> {
        let connection = self.connection()?;
        transaction::list_transactions(filter, &connection)
    }

    /// Create a transaction.
    pub fn create_transaction(&self, data: TransactionData) -> Result<Transaction, Error> {
        let connection = self.connection()?;
        transaction::create_transaction(data, &connection)
    }

    /// Replace every field of an existing transaction.
    pub fn update_transaction(
        &self,
        id: TransactionId,
        data: TransactionData,
    ) -> Result<Transaction, Error> {
        let connection = self.connection()?;
        transaction::update_transaction(id, data, &connection)
    }

    /// Delete a transaction.
    pub fn delete_transaction(&self, id: TransactionId) -> Result<(), Error> {
        let connection = self.connection()?;
        transaction::delete_transaction(id, &connection)
    }

    /// Income, expense and balance totals for `period`.
    ///
    /// Without a period every total is zero.
    pub fn get_summary(&self, period: Option<Period>) -> Result<MonthlySummary, Error> {
        let Some(period) = period else {
            return Ok(MonthlySummary::default());
        };

        let connection = self.connection()?;
        report::get_monthly_summary(period, &connection)
    }

    /// Expense totals per category for `period`, largest first.
    ///
    /// Without a period there are no statistics.
    pub fn get_category_stats(&self, period: Option<Period>) -> Result<Vec<CategoryStat>, Error> {
        let Some(period) = period else {
            return Ok(Vec::new());
        };

        let connection = self.connection()?;
        report::get_category_stats(period, &connection)
    }
}
