//! Stateless creative operations on top of the collaborator: demo image and
//! caption regeneration, free-text image edits, logo palettes and product albums.
//!
//! Every collaborator failure surfaces as `AppError::Collaborator`.

pub mod handlers;

use tracing::info;

use crate::collaborator::{AdCollaborator, ALBUM_DETAIL_COUNT};
use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::models::analysis::ImageAnalysis;
use crate::models::media::{GeneratedAlbum, ImageInput, ThemeResult};

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_ALBUM_SOURCE_BYTES: usize = 15 * 1024 * 1024;

/// MIME, size and base64 checks for a single image payload.
pub fn check_image(image: &ImageInput, max_bytes: usize) -> Result<(), AppError> {
    if !image.is_image() {
        return Err(AppError::validation(
            "NOT_AN_IMAGE",
            "Please upload an image file (PNG, JPG or WEBP).",
        ));
    }
    let bytes = image
        .decode()
        .map_err(|e| AppError::FileRead(e.to_string()))?;
    if bytes.len() > max_bytes {
        return Err(AppError::validation(
            "FILE_TOO_LARGE",
            format!("The file exceeds the {} MB limit.", max_bytes / (1024 * 1024)),
        ));
    }
    Ok(())
}

/// New demo image from the image feedback. `None` when the model sent no image.
pub async fn regenerate_image(
    collaborator: &dyn AdCollaborator,
    image: &ImageInput,
    analysis: &ImageAnalysis,
) -> Result<Option<String>, AppError> {
    check_image(image, MAX_IMAGE_BYTES)?;
    let generated = collaborator
        .generate_demo_image(image, analysis)
        .await
        .map_err(|e| AppError::collaborator("Failed to regenerate image from AI service.", e))?;
    Ok(generated.map(|i| i.data))
}

pub async fn regenerate_content(
    collaborator: &dyn AdCollaborator,
    analysis: &ImageAnalysis,
    original_content: &str,
) -> Result<String, AppError> {
    collaborator
        .generate_lifestyle_content(analysis, original_content)
        .await
        .map_err(|e| AppError::collaborator("Failed to regenerate content from AI service.", e))
}

pub async fn edit_image(
    collaborator: &dyn AdCollaborator,
    image: &ImageInput,
    instruction: &str,
) -> Result<Option<ImageInput>, AppError> {
    if instruction.trim().is_empty() {
        return Err(AppError::validation(
            "EMPTY_INSTRUCTION",
            "Describe the change you want to make.",
        ));
    }
    check_image(image, MAX_IMAGE_BYTES)?;
    collaborator
        .edit_image(image, instruction)
        .await
        .map_err(|e| AppError::collaborator("Failed to edit image with AI service.", e))
}

pub async fn extract_theme(
    collaborator: &dyn AdCollaborator,
    logo: &ImageInput,
) -> Result<ThemeResult, AppError> {
    check_image(logo, MAX_IMAGE_BYTES)?;
    collaborator
        .extract_theme(logo)
        .await
        .map_err(|e| AppError::collaborator("Failed to extract a theme from the logo.", e))
}

/// Shape checks on a returned album. With `include_model = false`, a shot
/// flagged as featuring a model breaks the contract.
pub fn check_album(album: &GeneratedAlbum, include_model: bool) -> Result<(), LlmError> {
    if album.details.len() != ALBUM_DETAIL_COUNT {
        return Err(LlmError::Schema(format!(
            "expected {ALBUM_DETAIL_COUNT} detail shots, got {}",
            album.details.len()
        )));
    }
    if let Some(empty) = album.images().position(|i| i.data.trim().is_empty()) {
        return Err(LlmError::Schema(format!("album image {empty} is empty")));
    }
    if !include_model {
        if let Some(flagged) = album.images().position(|i| i.includes_model) {
            return Err(LlmError::Schema(format!(
                "album image {flagged} shows a model although none was requested"
            )));
        }
    }
    Ok(())
}

pub async fn generate_album(
    collaborator: &dyn AdCollaborator,
    source: &ImageInput,
    include_model: bool,
) -> Result<GeneratedAlbum, AppError> {
    const FAILURE: &str = "Failed to generate the product album.";

    check_image(source, MAX_ALBUM_SOURCE_BYTES)?;
    let album = collaborator
        .generate_album(source, include_model)
        .await
        .map_err(|e| AppError::collaborator(FAILURE, e))?;
    check_album(&album, include_model).map_err(|e| AppError::collaborator(FAILURE, e))?;

    info!(include_model, details = album.details.len(), "Product album generated");
    Ok(album)
}
