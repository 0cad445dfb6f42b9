use std::sync::Arc;

use crate::analysis::controller::SharedController;
use crate::collaborator::AdCollaborator;
use crate::config::Config;
use crate::history::HistoryStore;
use crate::previews::PreviewRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable AI collaborator. Production: `GeminiCollaborator`.
    pub collaborator: Arc<dyn AdCollaborator>,
    pub history: HistoryStore,
    /// The current analysis and its state machine.
    pub controller: SharedController,
    pub previews: PreviewRegistry,
    pub config: Config,
}

#[cfg(test)]
pub fn test_config() -> Config {
    Config {
        gemini_api_key: "test-key".to_string(),
        gemini_api_url: "http://127.0.0.1:9".to_string(),
        redis_url: None,
        port: 0,
        max_body_bytes: 1024 * 1024,
        rust_log: "debug".to_string(),
    }
}

/// State backed by in-memory history and the given collaborator.
#[cfg(test)]
pub fn test_state(collaborator: Arc<dyn AdCollaborator>) -> AppState {
    use crate::history::store::MemoryKeyValueStore;

    AppState {
        collaborator,
        history: HistoryStore::new(Arc::new(MemoryKeyValueStore::default())),
        controller: SharedController::default(),
        previews: PreviewRegistry::default(),
        config: test_config(),
    }
}
