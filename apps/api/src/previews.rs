//! Preview handles for decoded uploads.
//!
//! A preview lives exactly as long as its `PreviewHandle`. Dropping a handle
//! (directly, or by replacing the `PreviewSet` that owns it) removes the entry
//! from the registry, so previews for superseded inputs are released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Clone)]
struct PreviewEntry {
    mime_type: String,
    bytes: Bytes,
}

/// Shared store of live previews.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<Mutex<HashMap<Uuid, PreviewEntry>>>,
}

impl PreviewRegistry {
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, PreviewEntry>> {
        // A poisoned map is still structurally valid.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers `bytes` and returns the handle that owns the entry.
    pub fn register(&self, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.lock().insert(
            id,
            PreviewEntry {
                mime_type: mime_type.into(),
                bytes: bytes.into(),
            },
        );
        debug!(%id, live = self.len(), "Preview registered");
        PreviewHandle {
            id,
            registry: self.clone(),
        }
    }

    /// `(mime_type, bytes)` of a live preview.
    pub fn get(&self, id: Uuid) -> Option<(String, Bytes)> {
        self.lock()
            .get(&id)
            .map(|e| (e.mime_type.clone(), e.bytes.clone()))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, id: Uuid) {
        self.lock().remove(&id);
    }
}

/// Owns one registry entry. Released on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> String {
        format!("/api/v1/previews/{}", self.id())
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

/// The previews of one set of inputs.
#[derive(Debug, Default)]
pub struct PreviewSet {
    handles: Vec<PreviewHandle>,
}

impl PreviewSet {
    pub fn new(handles: Vec<PreviewHandle>) -> Self {
        Self { handles }
    }

    /// Swaps in `next`; the previous handles are dropped and released here.
    pub fn replace(&mut self, next: PreviewSet) {
        *self = next;
    }

    pub fn urls(&self) -> Vec<String> {
        self.handles.iter().map(PreviewHandle::url).collect()
    }
}

/// GET /api/v1/previews/:id
pub async fn handle_get_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (mime_type, bytes) = state
        .previews
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("Preview {id} not found")))?;
    Ok(([(header::CONTENT_TYPE, mime_type)], bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_drop_releases_entry() {
        let registry = PreviewRegistry::default();
        let handle = registry.register("image/png", vec![1u8, 2, 3]);
        let id = handle.id();
        assert_eq!(registry.get(id).unwrap().1.as_ref(), &[1, 2, 3]);

        drop(handle);
        assert!(registry.get(id).is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_replace_releases_previous_set() {
        let registry = PreviewRegistry::default();
        let mut set = PreviewSet::new(vec![
            registry.register("image/png", vec![1u8]),
            registry.register("image/png", vec![2u8]),
        ]);
        assert_eq!(registry.len(), 2);

        set.replace(PreviewSet::new(vec![registry.register("image/jpeg", vec![3u8])]));
        assert_eq!(registry.len(), 1);
        assert_eq!(set.urls().len(), 1);

        set.replace(PreviewSet::default());
        assert_eq!(registry.len(), 0);
        assert!(set.urls().is_empty());
    }

    #[test]
    fn test_url_points_at_preview_route() {
        let registry = PreviewRegistry::default();
        let handle = registry.register("image/png", Vec::<u8>::new());
        assert_eq!(handle.url(), format!("/api/v1/previews/{}", handle.id()));
    }
}
