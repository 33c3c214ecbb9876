//! LLM Client: the single point of entry for calls to the local Ollama service.
//!
//! No other module talks to the model over HTTP. Handlers and the generation
//! pipeline depend on the `ModelInvoker` trait so tests can swap in stubs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model service unreachable: {0}")]
    Unavailable(String),

    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("could not decode model service response: {0}")]
    Decode(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Transport failures, rate limiting and 5xx responses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Unavailable(_) | LlmError::Timeout(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Decode(_) | LlmError::EmptyContent => false,
        }
    }
}

/// Model Invocation collaborator. Implementations hold their own endpoint and
/// model name; the pipeline only hands over prompt text.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Name of the model answering the prompts.
    fn model(&self) -> &str;

    /// Sends one prompt and returns the model's raw text reply.
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError>;

    /// Cheap reachability check for health reporting.
    async fn is_available(&self) -> bool;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub message: ResponseMessage,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Chat-completion client for an Ollama server.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
    max_attempts: u32,
    retry_delay: Duration,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
            max_attempts: max_attempts.max(1),
            retry_delay,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call_once(&self, body: &ChatRequest<'_>) -> Result<ChatResponse, LlmError> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<ChatResponse>().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.timeout)
            } else {
                LlmError::Decode(e.to_string())
            }
        })
    }

    fn classify(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Unavailable(e.to_string())
        }
    }
}

#[async_trait]
impl ModelInvoker for OllamaClient {
    fn model(&self) -> &str {
        &self.model
    }

    /// Retries retryable failures with exponential backoff: `retry_delay`, then
    /// doubling per attempt.
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let mut attempt = 0;
        loop {
            match self.call_once(&body).await {
                Ok(response) => {
                    debug!(
                        "LLM call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                        response.prompt_eval_count, response.eval_count
                    );
                    if response.message.content.trim().is_empty() {
                        return Err(LlmError::EmptyContent);
                    }
                    return Ok(response.message.content);
                }
                Err(e) if e.is_retryable() && attempt + 1 < self.max_attempts => {
                    let delay = self.retry_delay * (1 << attempt.min(6));
                    warn!(
                        "LLM call attempt {} failed ({e}), retrying after {}ms...",
                        attempt + 1,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}
