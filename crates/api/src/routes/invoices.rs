//! Invoice routes.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{ApiError, AppState, Store, middleware::AuthUser};
use khata_core::posting::CreateInvoiceInput;

/// Creates the invoice routes.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/invoices", post(create_invoice::<S>))
        .route("/invoices/{number}", get(get_invoice::<S>))
}

/// POST `/invoices` - Create an invoice, optionally linked to a transaction.
async fn create_invoice<S: Store>(
    State(state): State<AppState<S>>,
    auth: AuthUser,
    payload: Result<Json<CreateInvoiceInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(mut input) = payload?;
    input.created_by = Some(auth.user_id());

    let invoice = state
        .engine
        .create_invoice(input)
        .await
        .map_err(|e| ApiError::log(e, "Failed to create invoice"))?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

/// GET `/invoices/{number}` - Fetch an invoice.
async fn get_invoice<S: Store>(
    State(state): State<AppState<S>>,
    _auth: AuthUser,
    Path(number): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = state
        .engine
        .get_invoice(&number)
        .await
        .map_err(|e| ApiError::log(e, "Failed to get invoice"))?;

    Ok(Json(invoice))
}
