mod analysis;
mod collaborator;
mod collage;
mod config;
mod creative;
mod errors;
mod export;
mod history;
mod llm_client;
mod models;
mod previews;
mod routes;
mod state;
mod template;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::controller::SharedController;
use crate::collaborator::GeminiCollaborator;
use crate::config::Config;
use crate::history::store::{KeyValueStore, MemoryKeyValueStore, RedisKeyValueStore};
use crate::history::HistoryStore;
use crate::llm_client::LlmClient;
use crate::previews::PreviewRegistry;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting adcheck API v{}", env!("CARGO_PKG_VERSION"));

    // History storage: Redis when configured, otherwise process memory
    let kv: Arc<dyn KeyValueStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).context("Invalid REDIS_URL")?;
            info!("History stored in Redis");
            Arc::new(RedisKeyValueStore::new(client))
        }
        None => {
            info!("REDIS_URL not set, history kept in memory");
            Arc::new(MemoryKeyValueStore::default())
        }
    };

    // Initialize the AI collaborator
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_api_url.clone())
        .context("Failed to build HTTP client")?;
    info!(
        "Gemini client initialized (analysis model: {})",
        llm_client::ANALYSIS_MODEL
    );

    let state = AppState {
        collaborator: Arc::new(GeminiCollaborator::new(llm)),
        history: HistoryStore::new(kv),
        controller: SharedController::default(),
        previews: PreviewRegistry::default(),
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
