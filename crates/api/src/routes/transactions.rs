//! Transaction routes.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiError, AppState, Store, middleware::AuthUser};
use khata_core::ledger::PaymentStatus;
use khata_core::posting::{CreateTransactionInput, ListTransactionsQuery, PostingError};

/// Creates the transaction routes.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions::<S>).post(create_transaction::<S>),
        )
        .route("/transactions/count", get(count_transactions::<S>))
        .route("/transactions/{number}", get(get_transaction::<S>))
        .route("/transactions/{number}/status", patch(update_status::<S>))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a payment status change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    /// Target status.
    pub payment_status: Option<String>,
}

/// Response of the count endpoint.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    /// Matching transactions.
    pub count: u64,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/transactions` - Create and post a transaction.
async fn create_transaction<S: Store>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    payload: Result<Json<CreateTransactionInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(mut input) = payload?;
    input.created_by = Some(auth.user_id());

    let posted = state
        .engine
        .create_transaction(input)
        .await
        .map_err(|e| ApiError::log(e, "Failed to create transaction"))?;

    Ok((StatusCode::CREATED, Json(posted)))
}

/// GET `/transactions` - List transactions, newest first.
async fn list_transactions<S: Store>(
    State(state): State<AppState<S>>,
    _auth: AuthUser,
    query: Result<Query<ListTransactionsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;

    let page = state
        .engine
        .list_transactions(&query)
        .await
        .map_err(|e| ApiError::log(e, "Failed to list transactions"))?;

    Ok(Json(page))
}

/// GET `/transactions/count` - Count transactions matching the filters.
async fn count_transactions<S: Store>(
    State(state): State<AppState<S>>,
    _auth: AuthUser,
    query: Result<Query<ListTransactionsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;

    let count = state
        .engine
        .count_transactions(&query)
        .await
        .map_err(|e| ApiError::log(e, "Failed to count transactions"))?;

    Ok(Json(CountResponse { count }))
}

/// GET `/transactions/{number}` - A transaction with its ledger entries.
async fn get_transaction<S: Store>(
    State(state): State<AppState<S>>,
    _auth: AuthUser,
    Path(number): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let posted = state
        .engine
        .get_transaction(&number)
        .await
        .map_err(|e| ApiError::log(e, "Failed to get transaction"))?;

    Ok(Json(posted))
}

/// PATCH `/transactions/{number}/status` - Move a transaction's payment status.
async fn update_status<S: Store>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    Path(number): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;

    let Some(raw) = request.payment_status.filter(|s| !s.trim().is_empty()) else {
        return Err(PostingError::MissingFields(vec!["paymentStatus".to_string()]).into());
    };
    let next: PaymentStatus = raw.trim().parse().map_err(|_| {
        ApiError::from(PostingError::Validation {
            field: "paymentStatus".to_string(),
            message: format!("'{raw}' is not one of paid, pending, overdue, cancelled"),
        })
    })?;

    let updated = state
        .engine
        .update_payment_status(&number, next, Some(auth.user_id()))
        .await
        .map_err(|e| ApiError::log(e, "Failed to update payment status"))?;

    info!(
        transaction_number = %updated.transaction_number,
        user_id = %auth.user_id(),
        status = %updated.payment_status,
        "Payment status changed via API"
    );

    Ok(Json(updated))
}
