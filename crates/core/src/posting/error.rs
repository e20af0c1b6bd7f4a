//! Public error taxonomy of the posting engine.

use thiserror::Error;
use tracing::error;

use khata_shared::AppError;

use crate::calendar::CalendarError;
use crate::finance::FinanceError;
use crate::ledger::LedgerError;
use crate::sequence::AllocationError;
use crate::store::StoreError;

/// Errors returned by [`PostingEngine`](super::PostingEngine) operations.
#[derive(Debug, Error)]
pub enum PostingError {
    /// No authenticated user was supplied.
    #[error("Authentication required")]
    Unauthorized,

    /// Required fields were absent; every missing field is listed.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A field was present but malformed or out of bounds.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A date could not be parsed or converted.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// The identifier collides with an existing record.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Number allocation kept colliding; retry later.
    #[error("Could not allocate a unique number after {attempts} attempts, try again later")]
    AllocationExhausted {
        /// Attempts made.
        attempts: u32,
    },

    /// The addressed record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Unexpected storage or infrastructure failure. The detail is for logs.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PostingError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::MissingFields(_) | Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Calendar(err) => err.error_code(),
            Self::Conflict(_) => "CONFLICT",
            Self::AllocationExhausted { .. } => "ALLOCATION_EXHAUSTED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Ledger(err) => err.error_code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::MissingFields(_) | Self::Validation { .. } => 400,
            Self::Calendar(err) => err.http_status_code(),
            Self::Conflict(_) => 409,
            Self::AllocationExhausted { .. } => 503,
            Self::NotFound(_) => 404,
            Self::Ledger(err) => err.http_status_code(),
            Self::Internal(_) => 500,
        }
    }

    /// Returns true if the same request may succeed when retried later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AllocationExhausted { .. })
    }
}

impl From<FinanceError> for PostingError {
    fn from(err: FinanceError) -> Self {
        Self::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for PostingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(key) => Self::Conflict(format!("{key} already exists")),
            StoreError::Conflict(detail) => Self::Conflict(detail),
            StoreError::NotFound(key) => Self::NotFound(key),
            StoreError::Backend(detail) => {
                error!(error = %detail, "storage failure");
                Self::Internal(detail)
            }
        }
    }
}

impl From<AllocationError> for PostingError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::Exhausted { attempts } => Self::AllocationExhausted { attempts },
            AllocationError::DuplicateIdentifier(id) => Self::Conflict(format!("{id} already exists")),
            AllocationError::InvalidIdentifier(message) => Self::Validation {
                field: "identifier".to_string(),
                message,
            },
            AllocationError::Store(store) => store.into(),
        }
    }
}

impl From<PostingError> for AppError {
    fn from(err: PostingError) -> Self {
        match err {
            PostingError::Unauthorized => Self::Unauthorized(err.to_string()),
            PostingError::MissingFields(fields) => Self::MissingFields(fields),
            PostingError::Validation { .. } | PostingError::Calendar(_) => {
                Self::Validation(err.to_string())
            }
            PostingError::Conflict(message) => Self::Conflict(message),
            PostingError::AllocationExhausted { .. } => Self::ServiceUnavailable(err.to_string()),
            PostingError::NotFound(what) => Self::NotFound(what),
            PostingError::Ledger(ledger) => match ledger.http_status_code() {
                400 => Self::Validation(ledger.to_string()),
                422 => Self::BusinessRule(ledger.to_string()),
                _ => Self::Internal(ledger.to_string()),
            },
            PostingError::Internal(detail) => Self::Internal(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::PaymentStatus;
    use rust_decimal::Decimal;

    fn all_variants() -> Vec<PostingError> {
        vec![
            PostingError::Unauthorized,
            PostingError::MissingFields(vec!["category".into()]),
            PostingError::validation("type", "unknown"),
            PostingError::Calendar(CalendarError::OutOfRange("1900-01-01".into())),
            PostingError::Conflict("TRX-ACM-000001 already exists".into()),
            PostingError::AllocationExhausted { attempts: 6 },
            PostingError::NotFound("Transaction TRX-ACM-000009".into()),
            PostingError::Ledger(LedgerError::InvalidStatusTransition {
                from: PaymentStatus::Cancelled,
                to: PaymentStatus::Paid,
            }),
            PostingError::Ledger(LedgerError::Reconciliation {
                invoice_total: Decimal::ONE,
                transaction_amount: Decimal::TWO,
            }),
            PostingError::Ledger(LedgerError::DueBeforeIssue),
            PostingError::Ledger(LedgerError::SingleSided),
            PostingError::Internal("pool timed out".into()),
        ]
    }

    #[test]
    fn test_app_error_status_agrees() {
        for err in all_variants() {
            let status = err.http_status_code();
            let app: AppError = err.into();
            assert_eq!(app.status_code(), status, "{app:?}");
        }
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(
            PostingError::from(StoreError::UniqueViolation("TRX-ACM-000001".into())),
            PostingError::Conflict(_)
        ));
        assert!(matches!(
            PostingError::from(StoreError::Backend("socket closed".into())),
            PostingError::Internal(_)
        ));
    }

    #[test]
    fn test_allocation_error_mapping() {
        let err = PostingError::from(AllocationError::Exhausted { attempts: 6 });
        assert_eq!(err.http_status_code(), 503);
        assert!(err.is_retryable());

        let err = PostingError::from(AllocationError::DuplicateIdentifier("PO-1".into()));
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_internal_detail_is_masked_for_callers() {
        let app: AppError = PostingError::Internal("password=hunter2".into()).into();
        assert!(!app.public_message().contains("hunter2"));
    }

    #[test]
    fn test_missing_fields_message() {
        let err = PostingError::MissingFields(vec!["category".into(), "date".into()]);
        assert_eq!(err.to_string(), "Missing required fields: category, date");
    }
}
