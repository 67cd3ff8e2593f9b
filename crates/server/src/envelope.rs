//! Status-tagged JSON envelope shared by every API response.
//!
//! ```text
//! {"status":"success","data":[...]}
//! {"status":"success"}
//! {"status":"error","message":"404 - No matching records"}
//! ```

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Response body wrapper.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    /// Operation succeeded, optionally with a payload.
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<T>,
    },
    /// Operation failed.
    Error { message: String },
}

impl<T> Envelope<T> {
    /// Success carrying `data`.
    pub const fn data(data: T) -> Self {
        Self::Success { data: Some(data) }
    }

    /// Failure with a client-facing message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

impl Envelope<()> {
    /// Success without a payload.
    #[must_use]
    pub const fn ok() -> Self {
        Self::Success { data: None }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
