//! LLM completion collaborator.
//!
//! Summarization and question generation both talk to a chat-completion
//! endpoint through the [`ChatCompletion`] trait, so the pipeline can be
//! exercised against a scripted stand-in in tests and pointed at any
//! OpenAI-compatible server in production.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ArticleBiteError, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A single chat-completion call: one system instruction, one user message,
/// one text reply.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Sends the prompt pair and returns the model's reply text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String>;

    /// Short provider label used in error messages and logs.
    fn provider_name(&self) -> &'static str;
}

/// Connection settings for an OpenAI-compatible completion endpoint.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Base URL of the API server, without the `/v1/...` path.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub api_key: String,
    /// Model identifier passed through to the endpoint.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout: 60,
        }
    }
}

/// Client for any endpoint speaking the OpenAI chat-completions protocol.
#[derive(Debug)]
pub struct OpenAiCompletion {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl OpenAiCompletion {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`ArticleBiteError::Http`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(ArticleBiteError::Http)?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatCompletion for OpenAiCompletion {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ArticleBiteError::Timeout { timeout: self.config.timeout }
                } else {
                    ArticleBiteError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ArticleBiteError::Completion {
                provider: self.provider_name().to_string(),
                message: format!("HTTP {status}: {}", truncate(&detail, 200)),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(ArticleBiteError::Http)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ArticleBiteError::Completion {
                provider: self.provider_name().to_string(),
                message: "completion returned no content".to_string(),
            });
        }

        Ok(content)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
