use axum::{extract::State, Json};

use crate::analysis::controller::AnalysisSnapshot;
use crate::analysis::orchestrator::run_analysis;
use crate::analysis::validation::AnalysisSubmission;
use crate::errors::AppError;
use crate::models::analysis::PolicyAnalysisResult;
use crate::state::AppState;

/// POST /api/v1/analysis
///
/// The pipeline runs on its own task so that a dropped client connection
/// cannot leave the controller stuck mid-analysis.
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(submission): Json<AnalysisSubmission>,
) -> Result<Json<PolicyAnalysisResult>, AppError> {
    let result = tokio::spawn(run_analysis(state, submission))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("analysis task failed: {e}")))??;
    Ok(Json(result))
}

/// GET /api/v1/analysis/current
pub async fn handle_current(State(state): State<AppState>) -> Json<AnalysisSnapshot> {
    Json(state.controller.snapshot())
}
