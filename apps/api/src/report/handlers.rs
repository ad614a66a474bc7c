//! Axum route handlers for full analysis reports.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::extraction::handlers::read_upload;
use crate::matching::handlers::resolve_top_n;
use crate::report::{build_report, AnalysisReport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub skills: Vec<String>,
    pub top_n: Option<usize>,
}

/// POST /api/v1/analyze
///
/// Predictions plus gap analysis for an explicit skill list.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    if request.skills.iter().all(|s| s.trim().is_empty()) {
        return Err(AppError::Validation("skills cannot be empty".to_string()));
    }
    let top_n = resolve_top_n(request.top_n, state.config.default_top_n)?;
    let report = build_report(
        &state.matcher,
        &state.descriptions,
        &request.skills,
        top_n,
        state.config.gap_top_n,
    )?;
    Ok(Json(report))
}

/// POST /api/v1/analyze/resume
///
/// Extract → predict → gap analysis for an uploaded resume.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let document = read_upload(multipart).await?;
    let skills = state.extractor.extract(document).await?;
    if skills.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No skills could be extracted from the document".to_string(),
        ));
    }

    let report = build_report(
        &state.matcher,
        &state.descriptions,
        &skills,
        state.config.default_top_n,
        state.config.gap_top_n,
    )?;
    debug!(
        "Analysis {} built from {} extracted skills",
        report.report_id,
        skills.len()
    );
    Ok(Json(report))
}
