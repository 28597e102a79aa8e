//! Error types for web handlers.
//!
//! [`AppError`] bridges domain and render errors to HTTP responses.
//! Validation failures and out-of-sequence navigation never become
//! `AppError`s — handlers recover from those locally with a re-render or a
//! redirect. What reaches this type is genuinely broken: unknown
//! identities (404 page) and storage or template failures (generic 500
//! page, details only in the log).

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use bookings_core::BookingError;
use bookings_render::RenderError;
use std::fmt;

/// Application error type for web handlers.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code.
    status: StatusCode,
    /// User-facing message; never carries internals.
    message: String,
    /// Internal error, for logging only.
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            source: None,
        }
    }

    /// Attach the underlying error for the log.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into())
    }

    /// 403 Forbidden.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into())
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into())
    }

    /// 500 Internal Server Error with a generic message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }

    /// The response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    error = %source,
                    "internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    "internal server error"
                ),
            }
        }

        // Minimal page; no stack trace or internals reach the client.
        let body = format!(
            "<html><body><h1>{}</h1><p>{}</p></body></html>",
            self.status, self.message
        );
        (self.status, Html(body)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound => Self::not_found("Page Not Found"),
            BookingError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            BookingError::SessionMissing => Self::bad_request("Session record not found"),
            BookingError::StorageTimeout | BookingError::Storage(_) | BookingError::Constraint(_) => {
                Self::internal("Something went wrong").with_source(err.into())
            }
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        Self::internal("Something went wrong").with_source(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("Something went wrong").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[400 Bad Request] Invalid input");
    }

    #[test]
    fn storage_errors_become_generic_500s() {
        let err = AppError::from(BookingError::Storage("pg down: host 10.0.0.3".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The user-facing message must not leak internals.
        assert_eq!(err.message, "Something went wrong");
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::from(BookingError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
