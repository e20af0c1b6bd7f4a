//! Persistence-layer errors as seen by the domain.

use thiserror::Error;

/// Errors reported by a [`TransactionStore`](super::TransactionStore) or
/// [`InvoiceStore`](super::InvoiceStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A write collided with an existing unique key.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The record changed between read and write.
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    /// The addressed record does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Any other backend failure. The message is for logs only.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UniqueViolation(_) => "UNIQUE_VIOLATION",
            Self::Conflict(_) => "CONCURRENT_MODIFICATION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Backend(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::UniqueViolation(_) | Self::Conflict(_) => 409,
            Self::NotFound(_) => 404,
            Self::Backend(_) => 500,
        }
    }
}
