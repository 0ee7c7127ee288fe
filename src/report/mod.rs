//! Reports computed from the ledger for a calendar month.
//!
//! Reports are recomputed from the transactions on every request. Amounts
//! are summed as decimals, so many small amounts add up exactly.

mod category_stats;
mod endpoints;
mod summary;

pub use category_stats::{CategoryStat, get_category_stats};
pub use endpoints::{get_category_stats_endpoint, get_summary_endpoint};
pub use summary::{MonthlySummary, get_monthly_summary};
