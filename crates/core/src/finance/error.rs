//! Errors from amount calculations.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised when calculation inputs are out of bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinanceError {
    /// A monetary amount or quantity was negative.
    #[error("{field} cannot be negative")]
    NegativeAmount {
        /// Offending field.
        field: String,
    },

    /// A monetary amount or quantity exceeds the supported maximum.
    #[error("{field} exceeds the maximum of {max}")]
    AmountTooLarge {
        /// Offending field.
        field: String,
        /// Largest accepted value.
        max: Decimal,
    },

    /// A percentage rate fell outside 0..=100.
    #[error("{field} must be between 0 and 100, got {value}")]
    RateOutOfRange {
        /// Offending field.
        field: String,
        /// Value supplied.
        value: Decimal,
    },
}

impl FinanceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::AmountTooLarge { .. } => "AMOUNT_TOO_LARGE",
            Self::RateOutOfRange { .. } => "RATE_OUT_OF_RANGE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        400
    }

    /// Name of the input field the error refers to.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::NegativeAmount { field }
            | Self::AmountTooLarge { field, .. }
            | Self::RateOutOfRange { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_field() {
        let err = FinanceError::RateOutOfRange {
            field: "vatRate".into(),
            value: Decimal::new(150, 0),
        };
        assert_eq!(err.to_string(), "vatRate must be between 0 and 100, got 150");
        assert_eq!(err.field(), "vatRate");
        assert_eq!(err.error_code(), "RATE_OUT_OF_RANGE");
    }
}
