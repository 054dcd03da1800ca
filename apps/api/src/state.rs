use std::sync::Arc;

use crate::catalog::SkillsCatalog;
use crate::config::Config;
use crate::llm_client::InferenceClient;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Loaded once at startup and never mutated.
    pub catalog: Arc<SkillsCatalog>,
    /// Pluggable inference backend. Default: WatsonxClient.
    pub inference: Arc<dyn InferenceClient>,
    pub sessions: SessionStore,
}
