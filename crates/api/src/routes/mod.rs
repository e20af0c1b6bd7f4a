//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, Store, middleware::auth_middleware};

pub mod calendar;
pub mod health;
pub mod invoices;
pub mod transactions;

/// Creates the API router; posting routes sit behind the auth middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state<S: Store>(state: AppState<S>) -> Router<AppState<S>> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(transactions::routes())
        .merge(invoices::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(calendar::routes())
        .merge(protected_routes)
}
