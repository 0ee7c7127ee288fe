//! Spending and income categories for labelling transactions.

mod db;
mod domain;
mod endpoints;
mod resolve;

pub use db::{create_category, create_category_table, delete_category, get_all_categories};
pub use domain::{Category, CategoryName, NewCategory};
pub use endpoints::{create_category_endpoint, delete_category_endpoint, list_categories_endpoint};
pub use resolve::{CategoryLabel, JoinedCategory, UNCATEGORIZED_LABEL};
