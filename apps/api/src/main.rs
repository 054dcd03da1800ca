mod catalog;
mod coaching;
mod config;
mod errors;
mod llm_client;
mod models;
mod resume;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::SkillsCatalog;
use crate::config::Config;
use crate::llm_client::WatsonxClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values; credentials are optional)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerForge API v{}", env!("CARGO_PKG_VERSION"));

    // Skills catalog: read once, shared read-only by every session
    let catalog = Arc::new(SkillsCatalog::load_or_fallback(&config.skills_catalog_path));

    // Initialize inference client
    let inference = WatsonxClient::new(
        config.watsonx.clone(),
        Duration::from_secs(config.inference_timeout_secs),
    )?;
    info!(
        "Inference client initialized (model: {}, timeout: {}s)",
        llm_client::MODEL,
        config.inference_timeout_secs
    );

    let sessions = SessionStore::new(chrono::Duration::minutes(config.session_ttl_minutes));

    // Build app state
    let state = AppState {
        config: config.clone(),
        catalog,
        inference: Arc::new(inference),
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
