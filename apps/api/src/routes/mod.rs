pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::collage::handlers as collage;
use crate::creative::handlers as creative;
use crate::history::handlers as history;
use crate::state::AppState;
use crate::{export, previews};

/// Binary download with a `Content-Disposition: attachment` file name.
pub fn attachment(content_type: &'static str, file_name: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Policy analysis
        .route("/api/v1/analysis", post(analysis::handle_submit))
        .route("/api/v1/analysis/current", get(analysis::handle_current))
        .route(
            "/api/v1/analysis/regenerate-image",
            post(creative::handle_regenerate_image),
        )
        .route(
            "/api/v1/analysis/regenerate-content",
            post(creative::handle_regenerate_content),
        )
        // Creative tools
        .route("/api/v1/images/edit", post(creative::handle_edit_image))
        .route("/api/v1/theme", post(creative::handle_theme))
        .route("/api/v1/album", post(creative::handle_album))
        .route("/api/v1/album/archive", post(collage::handle_archive))
        .route("/api/v1/collage/previews", post(collage::handle_previews))
        .route("/api/v1/collage/export", post(collage::handle_export))
        // History
        .route(
            "/api/v1/history",
            get(history::handle_list).delete(history::handle_clear),
        )
        .route("/api/v1/history/:id", get(history::handle_get))
        .route("/api/v1/history/:id/restore", post(history::handle_restore))
        // Exports
        .route("/api/v1/export/csv", post(export::handle_export_csv))
        .route("/api/v1/export/report", post(export::handle_export_report))
        .route("/api/v1/previews/:id", get(previews::handle_get_preview))
        .layer(body_limit)
        .with_state(state)
}
