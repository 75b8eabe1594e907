//! Ingress errors for the webhook API
//!
//! Only requests that cannot be processed at all become errors. Record-level
//! sync failures are reported inside a 200 response body instead.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Body is not valid JSON or not the expected document
    #[error("malformed request: {0}")]
    BadRequest(String),
    /// Webhook signature missing or wrong
    #[error("invalid webhook signature")]
    Unauthorized,
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::BadRequest(e.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        tracing::warn!(status = %self.status_code(), error = %self, "Webhook rejected");
        let body = Json(serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        }));
        (self.status_code(), body).into_response()
    }
}

/// Convenience type alias for handler results
pub type ServiceResult<T> = Result<T, ServiceError>;
