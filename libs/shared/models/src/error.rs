use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Boundary error. Storage detail carried by `Conflict` and `Unavailable` is
/// logged, never sent to the client.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Text that is safe to show to a visitor.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ValidationFailed(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::Conflict(_) => {
                "The request conflicts with existing records. Please review and try again.".to_string()
            }
            AppError::Unavailable(_) => {
                "The clinic service is temporarily unavailable. Please try again.".to_string()
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::ValidationFailed(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Conflict(detail) | AppError::Unavailable(detail) => {
                tracing::error!("Error: {}: {}", status, detail);
            }
            other => {
                tracing::warn!("Rejected request: {}: {}", status, other);
            }
        }

        let body = Json(json!({
            "error": self.user_message()
        }));

        (status, body).into_response()
    }
}
