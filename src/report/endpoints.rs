//! Route handlers for the monthly reports.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    Error, Ledger, Period,
    report::{CategoryStat, MonthlySummary},
};

/// The query parameters for selecting the month of a report.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// A month in the format `YYYY-MM`.
    pub month: Option<String>,
}

impl ReportQuery {
    fn period(&self) -> Result<Option<Period>, Error> {
        Period::parse_optional(self.month.as_deref())
    }
}

/// A route handler for the income, expense and balance totals of a month.
pub async fn get_summary_endpoint(
    State(ledger): State<Ledger>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<MonthlySummary>, Error> {
    let period = query.period()?;

    ledger.get_summary(period).map(Json)
}

/// A route handler for the expense breakdown by category of a month.
pub async fn get_category_stats_endpoint(
    State(ledger): State<Ledger>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<CategoryStat>>, Error> {
    let period = query.period()?;

    ledger.get_category_stats(period).map(Json)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        CategoryStat, Ledger, MonthlySummary, TransactionType,
        category::{CategoryName, NewCategory},
        db::initialize,
        endpoints,
        transaction::{Amount, TransactionData},
    };

    use super::{get_category_stats_endpoint, get_summary_endpoint};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let ledger = Ledger::new(Arc::new(Mutex::new(connection)));

        let food = ledger
            .create_category(NewCategory {
                name: CategoryName::new_unchecked("Food"),
                kind: TransactionType::Expense,
                color: "bg-orange-500".to_owned(),
                icon: "🍔".to_owned(),
            })
            .unwrap();
        for (amount, date, kind, category_id) in [
            (dec!(500), date!(2024 - 03 - 01), TransactionType::Income, None),
            (dec!(60), date!(2024 - 03 - 02), TransactionType::Expense, Some(food.id)),
            (dec!(40), date!(2024 - 03 - 03), TransactionType::Expense, Some(food.id)),
            (dec!(1000), date!(2024 - 04 - 01), TransactionType::Expense, None),
        ] {
            ledger
                .create_transaction(
                    TransactionData::build(Amount::new(amount).unwrap(), date)
                        .kind(kind)
                        .category_id(category_id),
                )
                .unwrap();
        }

        let app = Router::new()
            .route(endpoints::SUMMARY, get(get_summary_endpoint))
            .route(endpoints::CATEGORY_STATS, get(get_category_stats_endpoint))
            .with_state(ledger);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn summary_for_month() {
        let server = get_test_server();

        let summary: MonthlySummary = server
            .get(endpoints::SUMMARY)
            .add_query_param("month", "2024-03")
            .await
            .json();

        assert_eq!(
            summary,
            MonthlySummary {
                income: dec!(500),
                expense: dec!(100),
                balance: dec!(400),
            }
        );
    }

    #[tokio::test]
    async fn summary_without_month_is_zero() {
        let server = get_test_server();

        let summary: Value = server.get(endpoints::SUMMARY).await.json();

        assert_eq!(summary, json!({ "income": 0, "expense": 0, "balance": 0 }));
    }

    #[tokio::test]
    async fn summary_rejects_malformed_month() {
        let server = get_test_server();

        let response = server
            .get(endpoints::SUMMARY)
            .add_query_param("month", "03-2024")
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("03-2024"));
    }

    #[tokio::test]
    async fn category_stats_for_month() {
        let server = get_test_server();

        let stats: Vec<CategoryStat> = server
            .get(endpoints::CATEGORY_STATS)
            .add_query_param("month", "2024-03")
            .await
            .json();

        assert_eq!(
            stats,
            [CategoryStat {
                name: "Food".to_owned(),
                color: "bg-orange-500".to_owned(),
                icon: "🍔".to_owned(),
                amount: dec!(100),
                percentage: dec!(100),
            }]
        );
    }

    #[tokio::test]
    async fn category_stats_without_month_are_empty() {
        let server = get_test_server();

        let stats: Value = server
            .get(endpoints::CATEGORY_STATS)
            .add_query_param("month", "")
            .await
            .json();

        assert_eq!(stats, json!([]));
    }
}
