//! Transactions in the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, its non-negative `Amount` and the `TransactionData` used to create or update one
//! - Database functions for storing, updating and deleting transactions
//! - Listing transactions with their categories, filtered by month
//! - Route handlers for the transaction API

mod core;
mod endpoints;
mod query;

pub use core::{
    Amount, Transaction, TransactionData, create_transaction, create_transaction_table,
    delete_transaction, update_transaction,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint,
    update_transaction_endpoint,
};
pub use query::{EnrichedTransaction, TransactionFilter, list_transactions};

#[cfg(test)]
pub use core::get_transaction;
