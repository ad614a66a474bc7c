//! Axum route handlers for skill extraction.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    /// Catalog skills as written in the catalog.
    pub skills: Vec<String>,
    /// The same skills after alias normalization, in the same order.
    pub normalized_skills: Vec<String>,
}

/// Reads the `file` field of a multipart upload.
pub async fn read_upload(mut multipart: Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some(FILE_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")));
        }
    }
    Err(AppError::Validation(format!(
        "Multipart body has no '{FILE_FIELD}' field"
    )))
}

/// POST /api/v1/extract
///
/// Extracts catalog skills from an uploaded PDF or plain-text document.
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let document = read_upload(multipart).await?;
    let skills = state.extractor.extract(document).await?;
    let normalized_skills = state.matcher.normalize(&skills);
    debug!("Extract request matched {} catalog skills", skills.len());
    Ok(Json(ExtractResponse {
        skills,
        normalized_skills,
    }))
}
