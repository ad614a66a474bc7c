use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::matching::MatchError;

/// Error returned by every route handler. Rendered as
/// `{"error": {"code", "message"}}` with a matching HTTP status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Unprocessable request: {0}")]
    UnprocessableEntity(String),

    #[error("Skill extraction failed: {0}")]
    Extraction(String),

    #[error(transparent)]
    Matching(#[from] MatchError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::UnprocessableEntity(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE_ENTITY")
            }
            AppError::Extraction(_) => (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_ERROR"),
            AppError::Matching(MatchError::UnknownLabel { .. }) => {
                (StatusCode::NOT_FOUND, "UNKNOWN_LABEL")
            }
            AppError::Matching(_) => (StatusCode::INTERNAL_SERVER_ERROR, "MATCHING_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Client-facing message. Server-side failures are logged and masked.
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::UnprocessableEntity(msg)
            | AppError::Extraction(msg) => msg.clone(),
            AppError::Matching(e @ MatchError::UnknownLabel { .. }) => e.to_string(),
            AppError::Matching(e) => {
                tracing::error!("Matching engine failure: {e}");
                "The matching engine failed to process the request".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "Unexpected server error".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = json!({
            "error": { "code": code, "message": self.public_message() }
        });
        (status, Json(body)).into_response()
    }
}
