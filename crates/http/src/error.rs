//! Error handling for the SHELF HTTP layer.
//!
//! Errors carry a `{"detail": ...}` response body: a string for not-found
//! and server errors, an array of field-level entries for validation
//! failures. All variants propagate straight to the response; there is no
//! local recovery.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        details: Vec<serde_json::Value>,
        message: String,
    },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error with field-level details
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Wrap a datastore failure as an internal error
    pub fn store(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();

        let (status, detail) = match self {
            AppError::Validation { details, message } => {
                tracing::warn!(error_id = %error_id, %message, "request validation failed");
                (StatusCode::UNPROCESSABLE_ENTITY, json!(details))
            }
            AppError::NotFound { message } => {
                tracing::debug!(error_id = %error_id, %message, "resource not found");
                (StatusCode::NOT_FOUND, json!(message))
            }
            AppError::Internal(e) => {
                tracing::error!(error_id = %error_id, error = %e, "request failed");
                // Hide internal error details outside of debug builds.
                let message = if cfg!(debug_assertions) {
                    e.to_string()
                } else {
                    "internal server error".to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, json!(message))
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn validation_error_carries_details() {
        let details = vec![json!({"field": "title", "error": "must be at most 255 characters"})];
        let error = AppError::validation(details.clone(), "validation failed");

        match error {
            AppError::Validation { details: d, message } => {
                assert_eq!(d, details);
                assert_eq!(message, "validation failed");
            }
            _ => panic!("expected Validation error"),
        }
    }

    #[test]
    fn not_found_maps_to_404() {
        let error = AppError::not_found("This book is not found.");
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_422() {
        let error = AppError::validation(vec![], "bad payload");
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn internal_maps_to_500() {
        let error = AppError::store(anyhow::anyhow!("database connection failed"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
