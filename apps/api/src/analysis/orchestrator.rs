//! Analysis pipeline: validate, primary call, best-effort enhancements, history.
//!
//! Only the primary call can fail the analysis. The demo image and lifestyle
//! caption run concurrently afterwards; each failure is logged and leaves its
//! optional field unset on the otherwise complete result.

use tracing::{info, warn};

use crate::analysis::controller::{AnalysisEvent, SharedController};
use crate::analysis::validation::{validate_submission, AnalysisSubmission, DecodedFile};
use crate::collaborator::{AdCollaborator, PolicyCheckRequest};
use crate::errors::AppError;
use crate::models::analysis::PolicyAnalysisResult;
use crate::previews::{PreviewRegistry, PreviewSet};
use crate::state::AppState;

const PRIMARY_FAILURE_MESSAGE: &str = "Failed to get analysis from AI service.";

pub fn register_previews(registry: &PreviewRegistry, files: Vec<DecodedFile>) -> PreviewSet {
    PreviewSet::new(
        files
            .into_iter()
            .map(|f| registry.register(f.mime_type, f.bytes))
            .collect(),
    )
}

/// Applies an event the pipeline itself sequenced. A rejection here means the
/// controller was moved underneath us; it is logged by the controller.
fn advance(controller: &SharedController, event: AnalysisEvent) {
    let _ = controller.apply(event);
}

/// Runs the demo image and lifestyle caption calls side by side.
///
/// Both need image analysis and at least one submitted image; otherwise the
/// result is returned untouched.
pub async fn enhance(
    collaborator: &dyn AdCollaborator,
    mut result: PolicyAnalysisResult,
    request: &PolicyCheckRequest,
) -> PolicyAnalysisResult {
    let (Some(image_analysis), Some(first_image)) =
        (result.image_analysis.clone(), request.images.first())
    else {
        return result;
    };

    let (demo_image, caption) = tokio::join!(
        collaborator.generate_demo_image(first_image, &image_analysis),
        collaborator.generate_lifestyle_content(&image_analysis, &request.content),
    );

    match demo_image {
        Ok(Some(image)) => result.generated_image = Some(image.data),
        Ok(None) => info!("Demo image call returned no image"),
        Err(e) => warn!("Demo image generation failed, continuing without it: {e}"),
    }

    match caption {
        Ok(text) if !text.trim().is_empty() => result.lifestyle_content = Some(text),
        Ok(_) => info!("Lifestyle caption came back empty"),
        Err(e) => warn!("Lifestyle caption generation failed, continuing without it: {e}"),
    }

    result
}

/// The full submission pipeline. Rejects with `409` while another analysis is in flight.
pub async fn run_analysis(
    state: AppState,
    submission: AnalysisSubmission,
) -> Result<PolicyAnalysisResult, AppError> {
    let controller = &state.controller;

    if let Err(e) = controller.apply(AnalysisEvent::Submitted) {
        return Err(AppError::Conflict(format!(
            "An analysis is already running ({e}). Wait for it to finish."
        )));
    }

    let validated = match validate_submission(&submission) {
        Ok(v) => v,
        Err(err) => {
            advance(controller, AnalysisEvent::ValidationFailed(err.body()));
            return Err(err);
        }
    };

    let previews = register_previews(&state.previews, validated.decoded);
    advance(
        controller,
        AnalysisEvent::ValidationPassed {
            inputs: validated.inputs.clone(),
            previews,
        },
    );

    info!(
        content_type = ?validated.request.content_type,
        check_type = ?validated.request.check_type,
        images = validated.request.images.len(),
        "Starting policy analysis"
    );

    let primary = match state.collaborator.analyze_policy(&validated.request).await {
        Ok(result) => result,
        Err(e) => {
            let err = AppError::collaborator(PRIMARY_FAILURE_MESSAGE, e);
            advance(controller, AnalysisEvent::PrimaryFailed(err.body()));
            return Err(err);
        }
    };
    advance(controller, AnalysisEvent::PrimarySucceeded(primary.clone()));

    let result = enhance(state.collaborator.as_ref(), primary, &validated.request).await;

    // Recorded while still Enhancing so the in-flight guard covers the history write.
    if let Err(e) = state.history.record(&result, validated.inputs).await {
        warn!("Could not save analysis to history: {e}");
    }
    advance(controller, AnalysisEvent::EnhancementsSettled(result.clone()));

    info!(status = ?result.status, violations = result.violations.len(), "Policy analysis complete");
    Ok(result)
}
