//! Model gateway: the boundary to the generative backend.
//!
//! `ModelBackend` is the seam the orchestrator calls through; `GeminiBackend`
//! is the production implementation over the Generative Language REST API.
//! One logical invocation performs one outbound call, unless the injected
//! retry policy explicitly allows more attempts on transient failures.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use nimbus_core::config::{GeminiConfig, RetryConfig};

use crate::error::AiError;
use crate::request::ModelChoice;

// =============================================================================
// Gateway contract
// =============================================================================

/// One ordered segment of a multimodal request.
#[derive(Debug, Clone)]
pub enum PromptPart {
    Text(String),
    Image { mime_type: String, bytes: Vec<u8> },
}

/// The model's raw textual reply.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
}

/// Boundary to the generative backend.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Send one composed request and return the raw reply text.
    async fn generate(
        &self,
        model: ModelChoice,
        parts: &[PromptPart],
        temperature: Option<f32>,
    ) -> Result<ModelReply, AiError>;

    /// Embed a single text.
    async fn embed(&self, text: &str, task_type: &str) -> Result<Vec<f32>, AiError>;
}

/// Retry strategy applied at the gateway boundary.
///
/// `max_attempts = 1` preserves at-most-one-invocation semantics. Only
/// transient upstream errors are retried; the n-th retry waits
/// `n * backoff_ms` milliseconds.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 500,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff_ms: config.backoff_ms,
        }
    }
}

// =============================================================================
// Gemini wire types
// =============================================================================

const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct WireContent {
    role: &'static str,
    parts: Vec<WirePart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Serialize)]
struct EmbedContentRequest {
    model: String,
    content: EmbedContent,
    #[serde(rename = "taskType", skip_serializing_if = "Option::is_none")]
    task_type: Option<String>,
}

#[derive(Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(Serialize)]
struct EmbedPart {
    text: String,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: Option<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

// =============================================================================
// GeminiBackend
// =============================================================================

/// Production backend over the Generative Language REST API.
pub struct GeminiBackend {
    http: reqwest::Client,
    config: GeminiConfig,
    api_key: String,
    retry: RetryPolicy,
}

impl GeminiBackend {
    /// Build a backend from configuration.
    ///
    /// Fails with `UpstreamUnavailable` when no API key can be resolved,
    /// so the service can start degraded and report 503 on AI routes.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, AiError> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            AiError::UpstreamUnavailable(
                "no API key configured (set gemini.api_key or GOOGLE_API_KEY)".to_string(),
            )
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AiError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            retry: RetryPolicy::from(&config.retry),
            config: config.clone(),
            api_key,
        })
    }

    /// Concrete model name for a tier.
    pub fn model_name(&self, choice: ModelChoice) -> &str {
        match choice {
            ModelChoice::Flash => &self.config.flash_model,
            ModelChoice::Pro => &self.config.pro_model,
        }
    }

    fn generation_config(&self, temperature: Option<f32>) -> GenerationConfig {
        GenerationConfig {
            temperature: temperature.unwrap_or(self.config.temperature),
            top_p: self.config.top_p,
            top_k: self.config.top_k,
            max_output_tokens: self.config.max_output_tokens,
        }
    }

    async fn generate_once(
        &self,
        model: &str,
        parts: &[PromptPart],
        temperature: Option<f32>,
    ) -> Result<ModelReply, AiError> {
        let wire_parts: Vec<WirePart> = parts
            .iter()
            .map(|part| match part {
                PromptPart::Text(text) => WirePart::Text { text: text.clone() },
                PromptPart::Image { mime_type, bytes } => WirePart::Inline {
                    inline_data: InlineData {
                        mime_type: mime_type.clone(),
                        data: BASE64.encode(bytes),
                    },
                },
            })
            .collect();

        let payload = GenerateContentRequest {
            contents: vec![WireContent {
                role: "user",
                parts: wire_parts,
            }],
            generation_config: self.generation_config(temperature),
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: SAFETY_THRESHOLD,
                })
                .collect(),
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, self.api_key
        );
        debug!(model, parts = parts.len(), "Gemini generateContent call");

        let response = self.http.post(&url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AiError::Internal(format!("malformed backend response: {}", e)))?;

        let text = body
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .map(|parts| {
                parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AiError::Internal(
                "backend returned no candidate text".to_string(),
            ));
        }

        Ok(ModelReply { text })
    }

    async fn embed_once(&self, text: &str, task_type: &str) -> Result<Vec<f32>, AiError> {
        let model = &self.config.embedding_model;
        let payload = EmbedContentRequest {
            model: format!("models/{}", model),
            content: EmbedContent {
                parts: vec![EmbedPart {
                    text: text.to_string(),
                }],
            },
            task_type: if task_type.trim().is_empty() {
                None
            } else {
                Some(task_type.to_ascii_uppercase())
            },
        };

        let url = format!(
            "{}/models/{}:embedContent?key={}",
            self.config.base_url, model, self.api_key
        );
        debug!(model, "Gemini embedContent call");

        let response = self.http.post(&url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body));
        }

        let body: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| AiError::Internal(format!("malformed backend response: {}", e)))?;

        body.embedding
            .map(|e| e.values)
            .ok_or_else(|| AiError::Internal("backend returned no embedding".to_string()))
    }

    async fn backoff(&self, attempt: u32) {
        let wait = self.retry.backoff_ms.saturating_mul(u64::from(attempt));
        if wait > 0 {
            tokio::time::sleep(Duration::from_millis(wait)).await;
        }
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn generate(
        &self,
        model: ModelChoice,
        parts: &[PromptPart],
        temperature: Option<f32>,
    ) -> Result<ModelReply, AiError> {
        let name = self.model_name(model).to_string();
        let mut attempt = 1;
        loop {
            match self.generate_once(&name, parts, temperature).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    warn!(attempt, error = %e, "Transient backend failure, retrying");
                    self.backoff(attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn embed(&self, text: &str, task_type: &str) -> Result<Vec<f32>, AiError> {
        let mut attempt = 1;
        loop {
            match self.embed_once(text, task_type).await {
                Ok(values) => return Ok(values),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    warn!(attempt, error = %e, "Transient backend failure, retrying");
                    self.backoff(attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Map an HTTP error status to the error taxonomy.
fn map_status(status: reqwest::StatusCode, body: &str) -> AiError {
    let detail = truncate(body, 200);
    match status.as_u16() {
        400 => AiError::InvalidInput(format!("backend rejected request: {}", detail)),
        401 | 403 => AiError::UpstreamUnavailable(format!("credentials rejected: {}", detail)),
        408 | 504 => AiError::UpstreamTimeout(format!("backend timed out: {}", detail)),
        429 => AiError::UpstreamRateLimited(detail),
        500..=599 => AiError::UpstreamUnavailable(format!("backend error {}: {}", status, detail)),
        _ => AiError::Internal(format!("unexpected status {}: {}", status, detail)),
    }
}

fn truncate(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        value.to_string()
    } else {
        let cut: String = value.chars().take(limit).collect();
        format!("{}…", cut)
    }
}

// =============================================================================
// MockBackend
// =============================================================================

/// Failure mode for [`MockBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Unavailable,
    RateLimited,
    Timeout,
}

/// Deterministic in-process backend for tests and offline development.
///
/// In echo mode the reply is the joined text of the prompt parts (image
/// parts contribute a `[mime/type]` marker), so identical requests always
/// produce identical replies.
pub struct MockBackend {
    fixed_reply: Option<String>,
    failure: Option<MockFailure>,
}

impl MockBackend {
    /// Reply by echoing the prompt parts.
    pub fn echo() -> Self {
        Self {
            fixed_reply: None,
            failure: None,
        }
    }

    /// Reply with a fixed string for every call.
    pub fn fixed(reply: impl Into<String>) -> Self {
        Self {
            fixed_reply: Some(reply.into()),
            failure: None,
        }
    }

    /// Fail every call with the given upstream error.
    pub fn failing(failure: MockFailure) -> Self {
        Self {
            fixed_reply: None,
            failure: Some(failure),
        }
    }

    fn fail(&self) -> Option<AiError> {
        self.failure.map(|f| match f {
            MockFailure::Unavailable => {
                AiError::UpstreamUnavailable("mock backend unavailable".to_string())
            }
            MockFailure::RateLimited => {
                AiError::UpstreamRateLimited("mock backend rate limited".to_string())
            }
            MockFailure::Timeout => AiError::UpstreamTimeout("mock backend timeout".to_string()),
        })
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    async fn generate(
        &self,
        _model: ModelChoice,
        parts: &[PromptPart],
        _temperature: Option<f32>,
    ) -> Result<ModelReply, AiError> {
        if let Some(err) = self.fail() {
            return Err(err);
        }
        if let Some(ref reply) = self.fixed_reply {
            return Ok(ModelReply {
                text: reply.clone(),
            });
        }
        let text = parts
            .iter()
            .map(|part| match part {
                PromptPart::Text(text) => text.clone(),
                PromptPart::Image { mime_type, .. } => format!("[{}]", mime_type),
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(ModelReply { text })
    }

    async fn embed(&self, text: &str, _task_type: &str) -> Result<Vec<f32>, AiError> {
        if let Some(err) = self.fail() {
            return Err(err);
        }
        // Deterministic pseudo-embedding derived from the text bytes.
        let seed: u32 = text.bytes().map(u32::from).sum();
        Ok((0..8).map(|i| ((seed + i) % 97) as f32 / 97.0).collect())
    }
}
