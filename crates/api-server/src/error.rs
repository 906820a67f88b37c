//! API error type and the JSON error envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use tasks_core::task::ValidationErrors;

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    pub details: Option<ValidationErrors>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// The detail is logged server-side and never sent to the client
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<tasks_core::Error> for ApiError {
    fn from(err: tasks_core::Error) -> Self {
        match err {
            tasks_core::Error::TaskNotFound(_) => Self::NotFound("Task not found".to_string()),
            other => {
                error!("Storage failure: {}", other);
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, details) = match self {
            Self::Validation(errors) => ("Validation failed".to_string(), Some(errors)),
            other => (other.to_string(), None),
        };

        (
            status,
            Json(ErrorResponse {
                status: status.as_u16(),
                message,
                details,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};
    use tasks_core::task::TaskValidator;

    async fn body_json(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn storage_failures_hide_details() {
        let err = ApiError::from(tasks_core::Error::Storage(
            "disk I/O error at /var/lib/tasks.db".to_string(),
        ));
        let (status, payload) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            payload,
            json!({ "status": 500, "message": "Internal server error", "details": null })
        );
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, payload) = body_json(tasks_core::Error::TaskNotFound(4).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(payload["message"], "Task not found");
    }

    #[tokio::test]
    async fn validation_errors_carry_field_details() {
        let errors = TaskValidator::default().validate_name("ab").unwrap_err();
        let (status, payload) = body_json(errors.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["status"], 400);
        assert_eq!(payload["message"], "Validation failed");
        assert_eq!(
            payload["details"]["name"],
            "name must be between 3 and 255 characters"
        );
    }
}
