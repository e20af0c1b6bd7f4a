//! Calendar conversion errors.

use thiserror::Error;

/// Errors raised while parsing or converting calendar dates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// The input is malformed or names a day that does not exist.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The date falls outside the supported Bikram Sambat table.
    #[error("Date out of supported range: {0}")]
    OutOfRange(String),
}

impl CalendarError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDate(_) => "INVALID_DATE",
            Self::OutOfRange(_) => "DATE_OUT_OF_RANGE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CalendarError::InvalidDate("2080-13-01".into()).error_code(),
            "INVALID_DATE"
        );
        assert_eq!(
            CalendarError::OutOfRange("1999-01-01".into()).error_code(),
            "DATE_OUT_OF_RANGE"
        );
        assert_eq!(CalendarError::OutOfRange(String::new()).http_status_code(), 400);
    }
}
