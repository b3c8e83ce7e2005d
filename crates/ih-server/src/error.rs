//! Error-to-HTTP response conversion.
//!
//! Route handlers return `Result<_, AppError>`; the status comes from
//! [`ih_core::Error::http_status`]. Server-class failures are logged and
//! answered with a generic message so upstream details do not leak.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: ih_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: ih_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn inner(&self) -> &ih_core::Error {
        &self.inner
    }
}

impl From<ih_core::Error> for AppError {
    fn from(e: ih_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error while rendering image"
            );
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            self.inner.to_string()
        };

        let body = json!({
            "error": message,
            "code": self.inner.code(),
            "request_id": self.request_id,
        });

        (status, axum::Json(body)).into_response()
    }
}
