//! Errors from document number allocation.

use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while allocating or claiming a document number.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Every attempt collided with a concurrent writer.
    #[error("Could not allocate a unique number after {attempts} attempts")]
    Exhausted {
        /// Attempts made, including the first.
        attempts: u32,
    },

    /// A client-supplied number is already in use.
    #[error("Identifier already exists: {0}")]
    DuplicateIdentifier(String),

    /// A client-supplied number is not acceptable.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The store failed for a reason other than a uniqueness conflict.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AllocationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Exhausted { .. } => "ALLOCATION_EXHAUSTED",
            Self::DuplicateIdentifier(_) => "DUPLICATE_IDENTIFIER",
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            Self::Store(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Exhausted { .. } => 503,
            Self::DuplicateIdentifier(_) => 409,
            Self::InvalidIdentifier(_) => 400,
            Self::Store(err) => err.http_status_code(),
        }
    }

    /// Returns true if the caller may retry the same request later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_codes() {
        assert_eq!(AllocationError::Exhausted { attempts: 6 }.http_status_code(), 503);
        assert_eq!(
            AllocationError::DuplicateIdentifier("TRX-ACM-000001".into()).http_status_code(),
            409
        );
        assert_eq!(
            AllocationError::Store(StoreError::Backend("down".into())).http_status_code(),
            500
        );
    }

    #[test]
    fn test_only_exhaustion_is_retryable() {
        assert!(AllocationError::Exhausted { attempts: 6 }.is_retryable());
        assert!(!AllocationError::DuplicateIdentifier(String::new()).is_retryable());
    }
}
