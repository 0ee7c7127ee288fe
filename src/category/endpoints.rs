//! Route handlers for managing categories.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error, Ledger,
    auth::UserId,
    category::{Category, NewCategory},
    database_id::CategoryId,
};

/// A route handler for listing all categories with their transaction counts.
pub async fn list_categories_endpoint(
    State(ledger): State<Ledger>,
) -> Result<Json<Vec<Category>>, Error> {
    ledger.list_categories().map(Json)
}

/// A route handler for creating a new category.
///
/// Responds with the created category and a 201 status code.
pub async fn create_category_endpoint(
    State(ledger): State<Ledger>,
    Extension(user_id): Extension<UserId>,
    Json(new_category): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let category = ledger.create_category(new_category)?;
    tracing::info!(
        "User {user_id} created category {} \"{}\"",
        category.id,
        category.name
    );

    Ok((StatusCode::CREATED, Json(category)))
}

/// A route handler for deleting a category.
///
/// Transactions in the category are kept and become uncategorized.
pub async fn delete_category_endpoint(
    State(ledger): State<Ledger>,
    Extension(user_id): Extension<UserId>,
    Path(category_id): Path<CategoryId>,
) -> Result<StatusCode, Error> {
    ledger.delete_category(category_id)?;
    tracing::info!("User {user_id} deleted category {category_id}");

    Ok(StatusCode::NO_CONTENT)
}
