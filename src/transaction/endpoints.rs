//! Route handlers for listing, creating, editing and deleting transactions.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    Error, Ledger, Period,
    auth::UserId,
    database_id::TransactionId,
    transaction::{EnrichedTransaction, Transaction, TransactionData, TransactionFilter},
};

/// The query parameters for listing transactions.
///
/// Both parameters are kept as text so that an empty value (e.g. `?month=`)
/// means "not set" rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    /// A month in the format `YYYY-MM`.
    pub month: Option<String>,
    /// The maximum number of transactions to return.
    pub limit: Option<String>,
}

impl TryFrom<TransactionQuery> for TransactionFilter {
    type Error = Error;

    fn try_from(query: TransactionQuery) -> Result<Self, Self::Error> {
        let period = Period::parse_optional(query.month.as_deref())?;

        let limit = match query.limit.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(limit) => Some(
                limit
                    .parse::<u32>()
                    .map_err(|_| Error::InvalidLimit(limit.to_owned()))?,
            ),
        };

        Ok(TransactionFilter { period, limit })
    }
}

/// A route handler for listing transactions, most recent first.
pub async fn list_transactions_endpoint(
    State(ledger): State<Ledger>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<EnrichedTransaction>>, Error> {
    let filter = TransactionFilter::try_from(query)?;
    tracing::debug!("User {user_id} listing transactions with {filter:?}");

    ledger.list_transactions(filter).map(Json)
}

/// A route handler for creating a new transaction.
///
/// Responds with the created transaction and a 201 status code.
pub async fn create_transaction_endpoint(
    State(ledger): State<Ledger>,
    Extension(user_id): Extension<UserId>,
    Json(data): Json<TransactionData>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let transaction = ledger.create_transaction(data)?;
    tracing::info!("User {user_id} created transaction {}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for replacing the fields of an existing transaction.
pub async fn update_transaction_endpoint(
    State(ledger): State<Ledger>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
    Json(data): Json<TransactionData>,
) -> Result<Json<Transaction>, Error> {
    let transaction = ledger.update_transaction(transaction_id, data)?;
    tracing::info!("User {user_id} updated transaction {transaction_id}");

    Ok(Json(transaction))
}

/// A route handler for deleting a transaction.
///
/// Deleting a transaction that does not exist also succeeds.
pub async fn delete_transaction_endpoint(
    State(ledger): State<Ledger>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    ledger.delete_transaction(transaction_id)?;
    tracing::info!("User {user_id} deleted transaction {transaction_id}");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod filter_tests {
    use time::Month;

    use crate::{Error, Period, transaction::TransactionFilter};

    use super::TransactionQuery;

    fn query(month: Option<&str>, limit: Option<&str>) -> TransactionQuery {
        TransactionQuery {
            month: month.map(str::to_owned),
            limit: limit.map(str::to_owned),
        }
    }

    #[test]
    fn empty_query_has_no_filters() {
        let filter = TransactionFilter::try_from(query(None, None)).unwrap();

        assert_eq!(filter, TransactionFilter::default());
    }

    #[test]
    fn empty_values_are_ignored() {
        let filter = TransactionFilter::try_from(query(Some(""), Some(""))).unwrap();

        assert_eq!(filter, TransactionFilter::default());
    }

    #[test]
    fn parses_month_and_limit() {
        let filter = TransactionFilter::try_from(query(Some("2024-03"), Some("5"))).unwrap();

        assert_eq!(
            filter,
            TransactionFilter {
                period: Some(Period::new(2024, Month::March)),
                limit: Some(5),
            }
        );
    }

    #[test]
    fn rejects_negative_limit() {
        let result = TransactionFilter::try_from(query(None, Some("-1")));

        assert_eq!(result, Err(Error::InvalidLimit("-1".to_owned())));
    }

    #[test]
    fn rejects_malformed_month() {
        let result = TransactionFilter::try_from(query(Some("March"), None));

        assert_eq!(result, Err(Error::InvalidPeriod("March".to_owned())));
    }
}

#[cfg(test)]
mod endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Router,
        http::StatusCode,
        routing::{get, put},
    };
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        Ledger, UserId,
        db::initialize,
        endpoints::{self, format_endpoint},
    };

    use super::{
        create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint,
        update_transaction_endpoint,
    };

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let ledger = Ledger::new(Arc::new(Mutex::new(connection)));

        let app = Router::new()
            .route(
                endpoints::TRANSACTIONS,
                get(list_transactions_endpoint).post(create_transaction_endpoint),
            )
            .route(
                endpoints::TRANSACTION,
                put(update_transaction_endpoint).delete(delete_transaction_endpoint),
            )
            .layer(Extension(UserId::new(1)))
            .with_state(ledger);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn create_then_list() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": 12.5,
                "date": "2024-03-05",
                "type": "expense",
                "note": "Lunch",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["description"], "Lunch");
        assert_eq!(created["category_id"], Value::Null);

        let listed: Value = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "2024-03")
            .await
            .json();
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["category_name"], "Uncategorized");
        assert_eq!(listed[0]["date"], "2024-03-05");
    }

    #[tokio::test]
    async fn list_rejects_malformed_month() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "2024-3")
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_rejects_negative_amount() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "amount": -1, "date": "2024-03-05", "type": "expense" }))
            .await;

        assert!(response.status_code().is_client_error());
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": 1,
                "date": "2024-03-05",
                "type": "expense",
                "category_id": 42,
            }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn update_missing_transaction_is_not_found() {
        let server = get_test_server();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, 99))
            .json(&json!({ "amount": 1, "date": "2024-03-05", "type": "income" }))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn update_then_delete() {
        let server = get_test_server();
        let created: Value = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "amount": 10, "date": "2024-03-05", "type": "expense" }))
            .await
            .json();
        let path = format_endpoint(endpoints::TRANSACTION, &created["id"]);

        let updated: Value = server
            .put(&path)
            .json(&json!({
                "amount": 20,
                "date": "2024-04-01",
                "type": "income",
                "description": "Refund",
            }))
            .await
            .json();
        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["type"], "income");
        assert_eq!(updated["description"], "Refund");

        server
            .delete(&path)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete(&path)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let listed: Value = server.get(endpoints::TRANSACTIONS).await.json();
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn malformed_id_is_rejected() {
        let server = get_test_server();

        let response = server.delete(&format_endpoint(endpoints::TRANSACTION, "abc")).await;

        response.assert_status_bad_request();
    }
}
