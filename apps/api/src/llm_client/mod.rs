/// LLM Client — the single point of entry for generative model calls.
///
/// No other module talks to the model API directly. Handlers receive a
/// `TextGenerator` through `AppState`, which is `VertexClient` in production.
///
/// Generation settings are policy constants, not request parameters.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub const MAX_OUTPUT_TOKENS: u32 = 2048;
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.8;
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The provider rejected the request itself (oversized prompt, bad config).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

/// Text-in, text-out model call.
///
/// `Ok(None)` means the model answered without any usable text; callers treat
/// it like an empty reply rather than an error.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate. Non-text parts are skipped.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleApiError {
    error: GoogleApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleApiErrorBody {
    message: String,
    #[serde(default)]
    status: String,
}

/// Vertex AI `generateContent` client with retry on rate limits and 5xx.
#[derive(Clone)]
pub struct VertexClient {
    client: Client,
    url: String,
    access_token: String,
}

impl VertexClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            url: generate_content_url(
                &config.vertex_endpoint,
                &config.project_id,
                &config.location,
                &config.model_name,
            ),
            access_token: config.vertex_access_token.clone(),
        })
    }

    /// Makes a raw call to the model, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, prompt: &str) -> Result<GenerateContentResponse, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig::default(),
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Model call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.url)
                .bearer_auth(&self.access_token)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Model API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(classify_error(status.as_u16(), body));
            }

            let parsed: GenerateContentResponse = response.json().await?;

            if let Some(usage) = &parsed.usage_metadata {
                debug!(
                    "Model call succeeded: prompt_tokens={}, output_tokens={}",
                    usage.prompt_token_count, usage.candidates_token_count
                );
            }

            return Ok(parsed);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl TextGenerator for VertexClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError> {
        let response = self.call(prompt).await?;
        if let Some(reason) = response.candidates.first().and_then(|c| c.finish_reason.as_deref())
        {
            debug!("Model finish reason: {reason}");
        }
        Ok(response.text())
    }
}

fn generate_content_url(endpoint: &str, project: &str, location: &str, model: &str) -> String {
    format!(
        "{}/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:generateContent",
        endpoint.trim_end_matches('/')
    )
}

/// Maps a non-retryable error response onto `LlmError`.
fn classify_error(status: u16, body: String) -> LlmError {
    match serde_json::from_str::<GoogleApiError>(&body) {
        Ok(parsed) if status == 400 && parsed.error.status == "INVALID_ARGUMENT" => {
            LlmError::InvalidArgument(parsed.error.message)
        }
        Ok(parsed) => LlmError::Api {
            status,
            message: parsed.error.message,
        },
        Err(_) => LlmError::Api {
            status,
            message: body,
        },
    }
}
