//! Shared types, errors, and configuration for Khata.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and validation for the session collaborator

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, PostingConfig};
pub use types::{InvoiceId, LedgerEntryId, PageRequest, Pagination, TransactionId, UserId};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
