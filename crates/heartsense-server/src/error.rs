//! Application error types and Axum response conversion.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use heartsense_core::{FieldIssue, InferenceError, ValidationError};
use serde::Serialize;

/// Detail returned for internal errors; the cause is only logged.
pub const INTERNAL_DETAIL: &str = "internal server error";

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    /// Client data is malformed or does not match the model schema.
    Validation(ValidationError),
    /// The inference capability is down or failed.
    InferenceUnavailable(String),
    /// Anything unexpected. The message is never sent to the client.
    Internal(String),
}

impl AppError {
    /// Error kind as it appears in response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "ValidationError",
            AppError::InferenceUnavailable(_) => "InferenceUnavailable",
            AppError::Internal(_) => "InternalError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InferenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<FieldIssue>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.kind();
        let body = match self {
            AppError::Validation(err) => ErrorResponse {
                error,
                detail: err.to_string(),
                issues: err.issues,
            },
            AppError::InferenceUnavailable(detail) => ErrorResponse {
                error,
                detail,
                issues: Vec::new(),
            },
            AppError::Internal(_) => ErrorResponse {
                error,
                detail: INTERNAL_DETAIL.into(),
                issues: Vec::new(),
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::InferenceUnavailable(err.to_string())
    }
}

/// Missing, oversized, mistyped or unparseable bodies are all validation failures.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(ValidationError::body(rejection.body_text()))
    }
}
