//! Uploaded file text acquisition.
//!
//! Plain-text uploads are decoded directly. Anything else is treated as an
//! image and run through a text recognition engine, created fresh for the
//! call and shut down again on every exit path, success or failure.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{ArticleBiteError, RawText, Result};

/// One live recognition session. Obtained from a [`RecognizerFactory`] and
/// consumed by [`RecognitionEngine::shutdown`] when the call ends.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Extracts text from the image bytes.
    async fn recognize(&self, image: &[u8]) -> Result<String>;

    /// Releases the session. Called exactly once per engine.
    async fn shutdown(self: Box<Self>) -> Result<()>;
}

/// Creates a [`RecognitionEngine`] per acquisition call.
#[async_trait]
pub trait RecognizerFactory: Send + Sync {
    async fn create(&self) -> Result<Box<dyn RecognitionEngine>>;
}

/// Turns an uploaded file into text.
///
/// Uploads with a `text/*` mime hint bypass recognition and are decoded as
/// UTF-8. For all other uploads an engine is created, asked to recognize the
/// bytes, and shut down before the result is returned; a recognition failure
/// still shuts the engine down and then surfaces the recognition error.
///
/// # Errors
///
/// Returns [`ArticleBiteError::Acquisition`] for undecodable text uploads
/// and empty recognition output, and propagates engine failures.
pub async fn recognize_upload(
    bytes: &[u8],
    mime_hint: Option<&str>,
    factory: &dyn RecognizerFactory,
) -> Result<RawText> {
    if mime_hint.is_some_and(|hint| hint.starts_with("text/")) {
        let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
            ArticleBiteError::Acquisition("text upload is not valid UTF-8".to_string())
        })?;
        return RawText::new(text);
    }

    let engine = factory.create().await?;
    let recognized = engine.recognize(bytes).await;
    let released = engine.shutdown().await;

    let text = recognized?;
    released?;

    debug!(bytes = bytes.len(), chars = text.len(), "recognized uploaded image");
    RawText::new(text)
}

/// Settings for the hosted recognition service.
#[derive(Debug, Clone, Default)]
pub struct RecognitionConfig {
    /// Endpoint accepting POSTed image bytes and answering `{"text": ...}`.
    /// Image uploads fail until one is configured.
    pub endpoint: String,
    /// Bearer token sent with recognition requests.
    pub api_key: String,
    /// Request timeout in seconds. Zero means the default of 60.
    pub timeout: u64,
}

/// Factory for sessions against a hosted recognition service.
#[derive(Debug, Clone)]
pub struct HostedRecognizer {
    config: RecognitionConfig,
}

impl HostedRecognizer {
    pub fn new(config: RecognitionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RecognizerFactory for HostedRecognizer {
    async fn create(&self) -> Result<Box<dyn RecognitionEngine>> {
        if self.config.endpoint.is_empty() {
            return Err(ArticleBiteError::Acquisition(
                "no recognition endpoint configured for image uploads".to_string(),
            ));
        }

        let timeout = if self.config.timeout == 0 { 60 } else { self.config.timeout };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(ArticleBiteError::Http)?;

        Ok(Box::new(HostedRecognitionSession {
            client,
            endpoint: self.config.endpoint.clone(),
            api_key: self.config.api_key.clone(),
            timeout,
        }))
    }
}

struct HostedRecognitionSession {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout: u64,
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    text: String,
}

#[async_trait]
impl RecognitionEngine for HostedRecognitionSession {
    async fn recognize(&self, image: &[u8]) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ArticleBiteError::Timeout { timeout: self.timeout }
                } else {
                    ArticleBiteError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArticleBiteError::Acquisition(format!(
                "recognition service answered HTTP {status}"
            )));
        }

        let parsed: RecognitionResponse = response.json().await.map_err(ArticleBiteError::Http)?;
        Ok(parsed.text)
    }

    async fn shutdown(self: Box<Self>) -> Result<()> {
        // The hosted service is stateless; dropping the client releases
        // everything this session holds.
        Ok(())
    }
}
