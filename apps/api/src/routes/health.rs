use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus whether inference credentials are configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let active_sessions = state.sessions.len().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "careerforge-api",
        "inference_configured": state.config.watsonx.is_complete(),
        "roles": state.catalog.roles().len(),
        "active_sessions": active_sessions
    }))
}
