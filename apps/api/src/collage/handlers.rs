use axum::{response::Response, Json};
use serde::{Deserialize, Serialize};

use crate::collage::archive::bundle_album;
use crate::collage::compositor::{
    collage_file_name, compose, render_previews, CollagePreview, EXPORT_WIDTH, MAX_WIDTH,
    MIN_WIDTH,
};
use crate::collage::layout::CollageLayout;
use crate::collage::select_details;
use crate::errors::AppError;
use crate::models::media::GeneratedAlbum;
use crate::routes::attachment;

#[derive(Deserialize)]
pub struct PreviewRequest {
    pub album: GeneratedAlbum,
    pub selected: Vec<usize>,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub previews: Vec<CollagePreview>,
}

#[derive(Deserialize)]
pub struct ExportRequest {
    pub album: GeneratedAlbum,
    pub selected: Vec<usize>,
    pub layout: CollageLayout,
    pub width: Option<u32>,
    /// Name of the uploaded source photo, used for the download name.
    pub source_name: Option<String>,
}

#[derive(Deserialize)]
pub struct ArchiveRequest {
    pub album: GeneratedAlbum,
    pub source_name: Option<String>,
}

/// POST /api/v1/collage/previews
pub async fn handle_previews(
    Json(req): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let images = select_details(&req.album, &req.selected)?;
    let previews = render_previews(images).await?;
    Ok(Json(PreviewResponse { previews }))
}

/// POST /api/v1/collage/export
pub async fn handle_export(
    Json(req): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let width = req.width.unwrap_or(EXPORT_WIDTH);
    if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
        return Err(AppError::validation(
            "INVALID_WIDTH",
            format!("Collage width must be between {MIN_WIDTH} and {MAX_WIDTH} pixels."),
        ));
    }

    let images = select_details(&req.album, &req.selected)?;
    let jpeg = compose(req.layout, images, width).await?;
    let file_name = collage_file_name(req.source_name.as_deref(), req.layout);
    tracing::info!(%file_name, width, "Collage exported");

    Ok(attachment("image/jpeg", &file_name, jpeg))
}

/// POST /api/v1/album/archive
pub async fn handle_archive(
    Json(req): Json<ArchiveRequest>,
) -> Result<Response, AppError> {
    let (file_name, bytes) = bundle_album(&req.album, req.source_name.as_deref())?;
    Ok(attachment("application/zip", &file_name, bytes))
}
