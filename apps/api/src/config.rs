use anyhow::{Context, Result};

use crate::llm_client::WatsonxCredentials;

/// Application configuration loaded from environment variables.
/// Inference credentials are optional at startup; their absence is reported per request.
#[derive(Debug, Clone)]
pub struct Config {
    pub watsonx: WatsonxCredentials,
    pub skills_catalog_path: String,
    pub inference_timeout_secs: u64,
    pub session_ttl_minutes: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            watsonx: WatsonxCredentials {
                url: optional_env("WATSONX_URL"),
                project_id: optional_env("WATSONX_PROJECT_ID"),
                api_key: optional_env("WATSONX_API_KEY"),
            },
            skills_catalog_path: std::env::var("SKILLS_CATALOG_PATH")
                .unwrap_or_else(|_| "skills.json".to_string()),
            inference_timeout_secs: parse_env("INFERENCE_TIMEOUT_SECS", 120)?,
            session_ttl_minutes: parse_env("SESSION_TTL_MINUTES", 60)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Empty values count as missing so a blank line in `.env` does not pass the credential check.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
