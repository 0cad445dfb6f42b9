use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::controller::{AnalysisEvent, AnalysisSnapshot};
use crate::errors::AppError;
use crate::models::history::{HistoryEntry, HistoryFile};
use crate::models::media::{data_url_mime, decode_base64};
use crate::previews::{PreviewRegistry, PreviewSet};
use crate::state::AppState;

/// Rebuilds previews for restored files. Files that no longer decode are skipped.
fn restore_previews(registry: &PreviewRegistry, files: &[HistoryFile]) -> PreviewSet {
    let handles = files
        .iter()
        .filter_map(|file| {
            let mime = data_url_mime(&file.data_url).unwrap_or("application/octet-stream");
            match decode_base64(&file.data_url) {
                Ok(bytes) => Some(registry.register(mime, bytes)),
                Err(e) => {
                    warn!(name = %file.name, "Skipping unreadable history file: {e}");
                    None
                }
            }
        })
        .collect();
    PreviewSet::new(handles)
}

async fn find_entry(state: &AppState, id: Uuid) -> Result<HistoryEntry, AppError> {
    state
        .history
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("History entry {id} not found")))
}

/// GET /api/v1/history
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    Ok(Json(state.history.list().await?))
}

/// DELETE /api/v1/history
pub async fn handle_clear(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.history.clear().await?;
    info!("History cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/history/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryEntry>, AppError> {
    Ok(Json(find_entry(&state, id).await?))
}

/// POST /api/v1/history/:id/restore
///
/// Loads a stored result and its inputs into the current analysis.
pub async fn handle_restore(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisSnapshot>, AppError> {
    let entry = find_entry(&state, id).await?;
    let previews = restore_previews(&state.previews, &entry.original_files);

    state
        .controller
        .apply(AnalysisEvent::Restored {
            entry: Box::new(entry),
            previews,
        })
        .map_err(|e| {
            AppError::Conflict(format!(
                "Cannot restore while an analysis is running ({e})."
            ))
        })?;

    info!(%id, "History entry restored");
    Ok(Json(state.controller.snapshot()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_previews_skips_broken_files() {
        let registry = PreviewRegistry::default();
        let files = vec![
            HistoryFile {
                name: "ok.webp".to_string(),
                data_url: "data:image/webp;base64,aGk=".to_string(),
            },
            HistoryFile {
                name: "broken.png".to_string(),
                data_url: "data:image/png;base64,%%%".to_string(),
            },
        ];
        let set = restore_previews(&registry, &files);
        assert_eq!(set.urls().len(), 1);
        assert_eq!(registry.len(), 1);
    }
}
