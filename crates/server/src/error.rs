//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`, and every failure body is the error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rideshare_core::{StoreError, ValidationError};
use thiserror::Error;

use crate::envelope::Envelope;
use crate::geocode::GeocodeError;

/// Message for an empty or non-matching lookup.
pub const NOT_FOUND_MESSAGE: &str = "404 - No matching records";

/// Message for an insert into a full store.
pub const CAPACITY_MESSAGE: &str = "404 - Out of memory";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order store rejected the operation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Order fields failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Geocode lookup failed.
    #[error("Geocode error: {0}")]
    Geocode(#[from] GeocodeError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            // Existing clients branch on the envelope status, not HTTP
            Self::Store(_) => StatusCode::OK,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Geocode(err) => match err {
                e if e.is_invalid_input() => StatusCode::BAD_REQUEST,
                GeocodeError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
                GeocodeError::QueueClosed | GeocodeError::InvalidUrl(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Store(StoreError::NotFound) => NOT_FOUND_MESSAGE.to_string(),
            Self::Store(StoreError::CapacityExceeded { .. }) => CAPACITY_MESSAGE.to_string(),
            Self::Validation(err) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Geocode(err) if err.is_invalid_input() => err.to_string(),
            Self::Geocode(GeocodeError::TimedOut(_)) => "Geocode lookup timed out".to_string(),
            Self::Geocode(_) => "External service error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        // Don't expose internal error details to clients
        (status, Envelope::<()>::error(self.message())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
