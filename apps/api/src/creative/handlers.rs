use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::controller::{AnalysisEvent, Enhancement};
use crate::creative;
use crate::errors::AppError;
use crate::models::analysis::ImageAnalysis;
use crate::models::media::{GeneratedAlbum, ImageInput, ThemeResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegenerateImageRequest {
    pub image: ImageInput,
    pub image_analysis: ImageAnalysis,
}

#[derive(Serialize)]
pub struct RegenerateImageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_image: Option<String>,
}

#[derive(Deserialize)]
pub struct RegenerateContentRequest {
    pub image_analysis: ImageAnalysis,
    #[serde(default)]
    pub original_content: String,
}

#[derive(Serialize)]
pub struct RegenerateContentResponse {
    pub lifestyle_content: String,
}

#[derive(Deserialize)]
pub struct EditImageRequest {
    pub image: ImageInput,
    #[serde(default)]
    pub instruction: String,
}

#[derive(Serialize)]
pub struct EditImageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInput>,
}

#[derive(Deserialize)]
pub struct ThemeRequest {
    pub logo: ImageInput,
}

#[derive(Deserialize)]
pub struct AlbumRequest {
    pub image: ImageInput,
    #[serde(default)]
    pub include_model: bool,
}

/// Merges a regeneration into the current result. Ignored (and logged by the
/// controller) when no finished analysis is showing.
fn merge_into_current(state: &AppState, update: Enhancement) {
    let _ = state
        .controller
        .apply(AnalysisEvent::EnhancementReplaced(update));
}

/// POST /api/v1/analysis/regenerate-image
pub async fn handle_regenerate_image(
    State(state): State<AppState>,
    Json(req): Json<RegenerateImageRequest>,
) -> Result<Json<RegenerateImageResponse>, AppError> {
    let generated_image =
        creative::regenerate_image(state.collaborator.as_ref(), &req.image, &req.image_analysis)
            .await?;
    merge_into_current(&state, Enhancement::GeneratedImage(generated_image.clone()));
    Ok(Json(RegenerateImageResponse { generated_image }))
}

/// POST /api/v1/analysis/regenerate-content
pub async fn handle_regenerate_content(
    State(state): State<AppState>,
    Json(req): Json<RegenerateContentRequest>,
) -> Result<Json<RegenerateContentResponse>, AppError> {
    let lifestyle_content = creative::regenerate_content(
        state.collaborator.as_ref(),
        &req.image_analysis,
        &req.original_content,
    )
    .await?;
    merge_into_current(&state, Enhancement::LifestyleContent(lifestyle_content.clone()));
    Ok(Json(RegenerateContentResponse { lifestyle_content }))
}

/// POST /api/v1/images/edit
pub async fn handle_edit_image(
    State(state): State<AppState>,
    Json(req): Json<EditImageRequest>,
) -> Result<Json<EditImageResponse>, AppError> {
    let image =
        creative::edit_image(state.collaborator.as_ref(), &req.image, &req.instruction).await?;
    Ok(Json(EditImageResponse { image }))
}

/// POST /api/v1/theme
pub async fn handle_theme(
    State(state): State<AppState>,
    Json(req): Json<ThemeRequest>,
) -> Result<Json<ThemeResult>, AppError> {
    Ok(Json(
        creative::extract_theme(state.collaborator.as_ref(), &req.logo).await?,
    ))
}

/// POST /api/v1/album
pub async fn handle_album(
    State(state): State<AppState>,
    Json(req): Json<AlbumRequest>,
) -> Result<Json<GeneratedAlbum>, AppError> {
    Ok(Json(
        creative::generate_album(state.collaborator.as_ref(), &req.image, req.include_model)
            .await?,
    ))
}
