pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::matching::handlers as matching;
use crate::report::handlers as report;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/api/v1/model", get(matching::handle_model))
        .route("/api/v1/labels", get(matching::handle_labels))
        .route("/api/v1/predict", post(matching::handle_predict))
        .route("/api/v1/gap", post(matching::handle_gap))
        .route("/api/v1/fit", post(matching::handle_fit))
        // Extraction API
        .route("/api/v1/extract", post(extraction::handle_extract))
        // Report API
        .route("/api/v1/analyze", post(report::handle_analyze))
        .route("/api/v1/analyze/resume", post(report::handle_analyze_resume))
        .with_state(state)
}
