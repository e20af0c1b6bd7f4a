//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Error responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use khata_core::posting::PostingEngine;
use khata_core::store::{InvoiceStore, TransactionStore};
use khata_shared::JwtService;

pub use error::ApiError;

/// Storage the API can serve from.
pub trait Store: TransactionStore + InvoiceStore + 'static {}

impl<T> Store for T where T: TransactionStore + InvoiceStore + 'static {}

/// Application state shared across handlers.
pub struct AppState<S> {
    /// Posting engine over the configured store.
    pub engine: Arc<PostingEngine<S>>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
}

impl<S> AppState<S> {
    /// Creates the state from an engine and a JWT service.
    #[must_use]
    pub fn new(engine: PostingEngine<S>, jwt_service: JwtService) -> Self {
        Self {
            engine: Arc::new(engine),
            jwt_service: Arc::new(jwt_service),
        }
    }
}

// Derived Clone would require `S: Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            jwt_service: Arc::clone(&self.jwt_service),
        }
    }
}

/// Creates the main application router.
pub fn create_router<S: Store>(state: AppState<S>) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
