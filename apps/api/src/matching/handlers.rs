//! Axum route handlers for the Matching API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::matching::gap::GapResult;
use crate::matching::ranker::Prediction;
use crate::matching::trainer::TrainingSummary;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub skills: Vec<String>,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
pub struct RoleQueryRequest {
    pub skills: Vec<String>,
    pub role: String,
    pub domain: String,
}

#[derive(Debug, Serialize)]
pub struct GapResponse {
    #[serde(flatten)]
    pub gap: GapResult,
    pub has_reference_data: bool,
}

impl From<GapResult> for GapResponse {
    fn from(gap: GapResult) -> Self {
        let has_reference_data = gap.has_reference_data();
        Self {
            gap,
            has_reference_data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FitResponse {
    pub role: String,
    pub domain: String,
    pub confidence: f64,
    pub match_percent: u32,
    pub gap: GapResponse,
}

#[derive(Debug, Serialize)]
pub struct LabelEntry {
    pub id: usize,
    pub role: String,
    pub domain: String,
}

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub summary: TrainingSummary,
    pub alias_count: usize,
}

/// Falls back to the configured default; zero is rejected.
pub fn resolve_top_n(requested: Option<usize>, default: usize) -> Result<usize, AppError> {
    match requested.unwrap_or(default) {
        0 => Err(AppError::Validation("top_n must be at least 1".to_string())),
        n => Ok(n),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/predict
///
/// Top-N `(role, domain, confidence)` for a skill list, confidence descending.
pub async fn handle_predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    let top_n = resolve_top_n(request.top_n, state.config.default_top_n)?;
    let predictions = state
        .matcher
        .predict_top_roles_domains(&request.skills, top_n)?;
    debug!(
        "Predicted {} labels for {} skills",
        predictions.len(),
        request.skills.len()
    );
    Ok(Json(PredictResponse { predictions }))
}

/// POST /api/v1/gap
///
/// Required and missing skills for one `(role, domain)`. Pairs without corpus
/// data return empty sets with `has_reference_data: false`.
pub async fn handle_gap(
    State(state): State<AppState>,
    Json(request): Json<RoleQueryRequest>,
) -> Result<Json<GapResponse>, AppError> {
    let gap = state
        .matcher
        .get_gap_skills(&request.skills, &request.role, &request.domain);
    debug!(
        "Gap for {} || {}: {} of {} required skills missing",
        request.role,
        request.domain,
        gap.gap_skills.len(),
        gap.required_skills.len()
    );
    Ok(Json(gap.into()))
}

/// POST /api/v1/fit
///
/// Confidence and gap for one trained `(role, domain)`; unknown pairs are 404.
pub async fn handle_fit(
    State(state): State<AppState>,
    Json(request): Json<RoleQueryRequest>,
) -> Result<Json<FitResponse>, AppError> {
    let role = request.role.trim();
    let domain = request.domain.trim();
    let confidence = state
        .matcher
        .confidence_for(&request.skills, role, domain)?;
    debug!("Fit for {role} || {domain}: confidence {confidence:.3}");
    let gap = state.matcher.get_gap_skills(&request.skills, role, domain);

    Ok(Json(FitResponse {
        role: role.to_string(),
        domain: domain.to_string(),
        confidence,
        match_percent: (confidence * 100.0).floor() as u32,
        gap: gap.into(),
    }))
}

/// GET /api/v1/labels
pub async fn handle_labels(State(state): State<AppState>) -> Json<Vec<LabelEntry>> {
    Json(
        state
            .matcher
            .labels()
            .map(|(id, label)| LabelEntry {
                id,
                role: label.role.clone(),
                domain: label.domain.clone(),
            })
            .collect(),
    )
}

/// GET /api/v1/model
///
/// Training summary, including the held-out evaluation when it was run.
pub async fn handle_model(State(state): State<AppState>) -> Json<ModelResponse> {
    Json(ModelResponse {
        summary: state.matcher.summary().clone(),
        alias_count: state.matcher.aliases().len(),
    })
}
