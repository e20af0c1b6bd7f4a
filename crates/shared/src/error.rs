//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// One or more required fields were absent.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Business rule violation.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Conflict (e.g., duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Temporarily unable to serve the request; safe to retry later.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Validation(_) | Self::MissingFields(_) => 400,
            Self::BusinessRule(_) => 422,
            Self::Conflict(_) => 409,
            Self::ServiceUnavailable(_) => 503,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) | Self::MissingFields(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the message may carry infrastructure detail and must
    /// not be shown to callers.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }

    /// Message safe to return to API callers.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized(String::new()), 401, "UNAUTHORIZED")]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::MissingFields(vec![]), 400, "VALIDATION_ERROR")]
    #[case(AppError::BusinessRule(String::new()), 422, "BUSINESS_RULE_VIOLATION")]
    #[case(AppError::Conflict(String::new()), 409, "CONFLICT")]
    #[case(AppError::ServiceUnavailable(String::new()), 503, "SERVICE_UNAVAILABLE")]
    #[case(AppError::Database(String::new()), 500, "DATABASE_ERROR")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_status_and_code(#[case] error: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.error_code(), code);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Unauthorized("msg".into()).to_string(),
            "Authentication failed: msg"
        );
        assert_eq!(
            AppError::MissingFields(vec!["category".into(), "date".into()]).to_string(),
            "Missing required fields: category, date"
        );
        assert_eq!(
            AppError::ServiceUnavailable("msg".into()).to_string(),
            "Service unavailable: msg"
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Database("connection refused at 10.0.0.3:5432".into());
        assert_eq!(err.public_message(), "An internal error occurred");

        let err = AppError::Conflict("TRX-ACM-000001 already exists".into());
        assert_eq!(err.public_message(), "Conflict: TRX-ACM-000001 already exists");
    }
}
