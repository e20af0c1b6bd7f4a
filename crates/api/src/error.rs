//! Error responses.
//!
//! Every failure leaves the API as `{ "error": <message>, "code": <CODE> }`,
//! with `fields` added when specific inputs are at fault. Internal failures are
//! logged here and answered with a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};

use khata_core::calendar::CalendarError;
use khata_core::posting::PostingError;
use khata_shared::AppError;

/// Body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Offending fields, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
                code,
                fields: None,
            },
        }
    }

    /// 401 with the given code.
    #[must_use]
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    /// 400 for a request that could not be decoded.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    #[must_use]
    fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.body.fields = Some(fields);
        self
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable code of this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.body.code
    }

    /// Logs a failure with its context and converts it.
    ///
    /// Server-side failures are logged at `error`, caller mistakes at `debug`.
    pub fn log(err: PostingError, context: &'static str) -> Self {
        if err.http_status_code() >= 500 {
            error!(error = %err, code = err.error_code(), "{context}");
        } else {
            debug!(error = %err, code = err.error_code(), "{context}");
        }
        err.into()
    }
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let fields = match &err {
            AppError::MissingFields(fields) => Some(fields.clone()),
            _ => None,
        };
        let api = Self::new(
            status_from(err.status_code()),
            err.error_code(),
            err.public_message(),
        );
        match fields {
            Some(fields) => api.with_fields(fields),
            None => api,
        }
    }
}

impl From<PostingError> for ApiError {
    fn from(err: PostingError) -> Self {
        let status = status_from(err.http_status_code());
        let code = err.error_code();
        let fields = match &err {
            PostingError::MissingFields(fields) => Some(fields.clone()),
            PostingError::Validation { field, .. } => Some(vec![field.clone()]),
            _ => None,
        };
        let message = if status.is_server_error() {
            AppError::from(err).public_message()
        } else {
            err.to_string()
        };

        let api = Self::new(status, code, message);
        match fields {
            Some(fields) => api.with_fields(fields),
            None => api,
        }
    }
}

impl From<CalendarError> for ApiError {
    fn from(err: CalendarError) -> Self {
        PostingError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_listed() {
        let api: ApiError =
            PostingError::MissingFields(vec!["category".into(), "date".into()]).into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert_eq!(api.body.fields.as_deref(), Some(&["category".to_string(), "date".to_string()][..]));
        assert_eq!(api.body.error, "Missing required fields: category, date");
    }

    #[test]
    fn test_internal_detail_hidden() {
        let api: ApiError = PostingError::Internal("connection refused on 10.0.0.3".into()).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.body.error, "An internal error occurred");
    }

    #[test]
    fn test_exhaustion_is_unavailable() {
        let api: ApiError = PostingError::AllocationExhausted { attempts: 6 }.into();
        assert_eq!(api.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(api.code(), "ALLOCATION_EXHAUSTED");
    }
}
