//! LLM Client: the single point of entry for all text-generation calls in CareerForge.
//!
//! ARCHITECTURAL RULE: No other module may call the inference endpoint directly.
//! All LLM interactions MUST go through an `InferenceClient`.
//!
//! Model: ibm/granite-3-8b-instruct, pinned in `MODEL`.
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[cfg(test)]
pub mod testing;

const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";
const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
const GENERATION_API_VERSION: &str = "2023-05-29";
/// The model used for all LLM calls in CareerForge.
pub const MODEL: &str = "ibm/granite-3-8b-instruct";
const MAX_NEW_TOKENS: u32 = 500;
const MIN_NEW_TOKENS: u32 = 10;
const REPETITION_PENALTY: f32 = 1.1;
/// Refresh the IAM token this long before it actually expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LlmError {
    /// Credentials are absent. Raised before any network activity.
    #[error("Inference is not configured: missing {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Inference request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    fn transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Http(e)
        }
    }
}

/// A text-generation backend. Takes a finished prompt, returns the generated text.
///
/// Carried in `AppState` as `Arc<dyn InferenceClient>` so tests can swap in a scripted fake.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Generation parameters
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodingMethod {
    Greedy,
}

/// Fixed sampling parameters sent with every request.
///
/// Decoding is greedy, so no temperature is sent: the endpoint ignores it under greedy
/// decoding and sending one would suggest sampling that never happens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub decoding_method: DecodingMethod,
    pub max_new_tokens: u32,
    pub min_new_tokens: u32,
    pub repetition_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            decoding_method: DecodingMethod::Greedy,
            max_new_tokens: MAX_NEW_TOKENS,
            min_new_tokens: MIN_NEW_TOKENS,
            repetition_penalty: REPETITION_PENALTY,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Credentials
// ────────────────────────────────────────────────────────────────────────────

/// watsonx.ai credentials as read from the environment. Any of them may be absent.
#[derive(Clone, Default)]
pub struct WatsonxCredentials {
    pub url: Option<String>,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for WatsonxCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatsonxCredentials")
            .field("url", &self.url)
            .field("project_id", &self.project_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

struct ResolvedCredentials<'a> {
    url: &'a str,
    project_id: &'a str,
    api_key: &'a str,
}

impl WatsonxCredentials {
    pub fn is_complete(&self) -> bool {
        self.resolve().is_ok()
    }

    fn resolve(&self) -> Result<ResolvedCredentials<'_>, LlmError> {
        match (&self.url, &self.project_id, &self.api_key) {
            (Some(url), Some(project_id), Some(api_key)) => Ok(ResolvedCredentials {
                url,
                project_id,
                api_key,
            }),
            _ => {
                let missing: Vec<&str> = [
                    ("WATSONX_URL", self.url.is_none()),
                    ("WATSONX_PROJECT_ID", self.project_id.is_none()),
                    ("WATSONX_API_KEY", self.api_key.is_none()),
                ]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| name)
                .collect();
                Err(LlmError::Configuration(missing.join(", ")))
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model_id: &'a str,
    project_id: &'a str,
    input: &'a str,
    parameters: &'a GenerationParams,
}

#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    pub results: Vec<GenerationResult>,
}

#[derive(Debug, Deserialize)]
pub struct GenerationResult {
    pub generated_text: String,
    pub generated_token_count: Option<u32>,
    pub input_token_count: Option<u32>,
    pub stop_reason: Option<String>,
}

impl GenerationResponse {
    /// Text of the first result, if the model produced anything.
    pub fn text(&self) -> Option<&str> {
        self.results
            .first()
            .map(|r| r.generated_text.as_str())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct WatsonxErrorBody {
    #[serde(default)]
    errors: Vec<WatsonxErrorItem>,
}

#[derive(Debug, Deserialize)]
struct WatsonxErrorItem {
    message: String,
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

// ────────────────────────────────────────────────────────────────────────────
// WatsonxClient
// ────────────────────────────────────────────────────────────────────────────

/// The production inference client: IBM watsonx.ai text generation.
///
/// One attempt per call with a bounded timeout. Failures are returned to the caller,
/// which shows them to the user; nothing is retried here.
#[derive(Clone)]
pub struct WatsonxClient {
    client: Client,
    credentials: WatsonxCredentials,
    params: GenerationParams,
    token: Arc<Mutex<Option<CachedToken>>>,
    iam_url: String,
    /// Budget for one whole `generate` call, token exchange included.
    timeout: Duration,
}

impl WatsonxClient {
    pub fn new(credentials: WatsonxCredentials, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        if !credentials.is_complete() {
            warn!("watsonx credentials incomplete; inference requests will fail until configured");
        }
        Ok(Self {
            client,
            credentials,
            params: GenerationParams::default(),
            token: Arc::new(Mutex::new(None)),
            iam_url: IAM_TOKEN_URL.to_string(),
            timeout,
        })
    }

    /// Returns a cached IAM bearer token, exchanging the API key for a fresh one when needed.
    async fn access_token(&self, api_key: &str) -> Result<String, LlmError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() + TOKEN_REFRESH_MARGIN < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .client
            .post(&self.iam_url)
            .header("accept", "application/json")
            .form(&[("grant_type", IAM_GRANT_TYPE), ("apikey", api_key)])
            .send()
            .await
            .map_err(LlmError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(LlmError::transport)?;
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: format!("IAM token exchange failed: {body}"),
            });
        }

        let iam: IamTokenResponse = serde_json::from_str(&body)?;
        debug!("IAM token refreshed, expires in {}s", iam.expires_in);
        *cached = Some(CachedToken {
            value: iam.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(iam.expires_in),
        });
        Ok(iam.access_token)
    }

    async fn request_generation(
        &self,
        creds: ResolvedCredentials<'_>,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let token = self.access_token(creds.api_key).await?;

        let endpoint = format!(
            "{}/ml/v1/text/generation?version={GENERATION_API_VERSION}",
            creds.url.trim_end_matches('/')
        );
        let request_body = GenerationRequest {
            model_id: MODEL,
            project_id: creds.project_id,
            input: prompt,
            parameters: &self.params,
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&token)
            .header("accept", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(LlmError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(LlmError::transport)?;

        if !status.is_success() {
            warn!("watsonx returned {}", status);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let generation: GenerationResponse = serde_json::from_str(&body)?;
        if let Some(result) = generation.results.first() {
            info!(
                "Generation finished in {}ms: input_tokens={:?}, output_tokens={:?}, stop_reason={:?}",
                started.elapsed().as_millis(),
                result.input_token_count,
                result.generated_token_count,
                result.stop_reason
            );
        }

        generation
            .text()
            .map(|t| t.trim().to_string())
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl InferenceClient for WatsonxClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let creds = self.credentials.resolve()?;
        tokio::time::timeout(self.timeout, self.request_generation(creds, prompt))
            .await
            .map_err(|_| LlmError::Timeout)?
    }
}

/// Pulls the human-readable messages out of a watsonx error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<WatsonxErrorBody>(body)
        .ok()
        .filter(|b| !b.errors.is_empty())
        .map(|b| {
            b.errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ")
        })
        .unwrap_or_else(|| body.to_string())
}
