//! Notecard generation pipeline.
//!
//! This module provides the primary API for turning a content source into a
//! deck of study notecards. The main entry point is the [`NotecardPipeline`]
//! struct, along with convenience functions like [`run_url`] and [`run_text`].
//!
//! # Example
//!
//! ```no_run
//! use articlebite_core::{GenerationRequest, NotecardPipeline, PipelineConfig, SourceDescriptor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder()
//!         .api_key("sk-...")
//!         .model("gpt-4o-mini")
//!         .build();
//!
//!     let pipeline = NotecardPipeline::new(config)?;
//!     let request = GenerationRequest::default();
//!     let deck = pipeline
//!         .generate_deck(SourceDescriptor::Url("https://example.com/article".into()), &request)
//!         .await?;
//!
//!     println!("{}", deck.to_text());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::acquire::recognize::{HostedRecognizer, RecognitionConfig, RecognizerFactory};
use crate::acquire::transcript::{CaptionProvider, TimedTextCaptions};
use crate::acquire::{AcquireConfig, page, recognize, transcript};
use crate::chunk::{DEFAULT_CHUNK_LEN, chunk_text};
use crate::generate::{self, GeneratedDocument};
use crate::llm::{ChatCompletion, CompletionConfig, OpenAiCompletion};
use crate::parser::parse_document;
use crate::summarize::summarize_chunks;
use crate::{
    ArticleBiteError, Deck, GenerationRequest, Notecard, RawText, Result, SourceDescriptor,
};

/// Configuration for a pipeline instance.
///
/// # Example
///
/// ```rust
/// use articlebite_core::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .api_key("sk-...")
///     .chunk_len(2000)
///     .timeout(120)
///     .build();
/// assert_eq!(config.chunk_len, 2000);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// HTTP settings for page and caption requests.
    pub acquire: AcquireConfig,

    /// Completion endpoint settings.
    pub completion: CompletionConfig,

    /// Recognition service settings for image uploads.
    pub recognition: RecognitionConfig,

    /// Maximum characters per summarization chunk (default: 4000).
    pub chunk_len: usize,

    /// Caption language requested for transcripts (default: "en").
    pub caption_language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            acquire: AcquireConfig::default(),
            completion: CompletionConfig::default(),
            recognition: RecognitionConfig::default(),
            chunk_len: DEFAULT_CHUNK_LEN,
            caption_language: "en".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Creates a new builder for PipelineConfig.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

/// Builder for [`PipelineConfig`].
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: PipelineConfig::default() }
    }

    /// Sets the completion API key.
    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        self.config.completion.api_key = value.into();
        self
    }

    /// Sets the completion model identifier.
    pub fn model(mut self, value: impl Into<String>) -> Self {
        self.config.completion.model = value.into();
        self
    }

    /// Sets the completion endpoint base URL.
    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.config.completion.base_url = value.into();
        self
    }

    /// Sets the timeout in seconds for all outbound requests.
    pub fn timeout(mut self, value: u64) -> Self {
        self.config.acquire.timeout = value;
        self.config.completion.timeout = value;
        self.config.recognition.timeout = value;
        self
    }

    /// Sets the User-Agent header for acquisition requests.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.acquire.user_agent = value.into();
        self
    }

    /// Sets the maximum characters per summarization chunk.
    pub fn chunk_len(mut self, value: usize) -> Self {
        self.config.chunk_len = value;
        self
    }

    /// Sets the recognition service endpoint for image uploads.
    pub fn recognition_endpoint(mut self, value: impl Into<String>) -> Self {
        self.config.recognition.endpoint = value.into();
        self
    }

    /// Sets the recognition service API key.
    pub fn recognition_api_key(mut self, value: impl Into<String>) -> Self {
        self.config.recognition.api_key = value.into();
        self
    }

    /// Sets the caption language for transcripts.
    pub fn caption_language(mut self, value: impl Into<String>) -> Self {
        self.config.caption_language = value.into();
        self
    }

    /// Builds the config.
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main entry point for notecard generation.
///
/// A pipeline instance holds its configuration and collaborators and can
/// serve any number of runs. Each run is independent: it acquires its own
/// source, makes its own completion calls, and releases every transient
/// resource before returning, so runs may execute concurrently.
pub struct NotecardPipeline {
    config: PipelineConfig,
    llm: Arc<dyn ChatCompletion>,
    recognizer: Arc<dyn RecognizerFactory>,
    captions: Arc<dyn CaptionProvider>,
}

impl NotecardPipeline {
    /// Creates a pipeline with the default collaborators: an OpenAI-style
    /// completion client, the hosted recognition service, and timedtext
    /// captions.
    ///
    /// # Errors
    ///
    /// Returns [`ArticleBiteError::Http`] when the completion client cannot
    /// be constructed.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let llm = Arc::new(OpenAiCompletion::new(config.completion.clone())?);
        Ok(Self::with_completion(config, llm))
    }

    /// Creates a pipeline with a custom completion collaborator and default
    /// acquisition collaborators.
    pub fn with_completion(config: PipelineConfig, llm: Arc<dyn ChatCompletion>) -> Self {
        let recognizer = Arc::new(HostedRecognizer::new(config.recognition.clone()));
        let mut captions = TimedTextCaptions::new(config.acquire.clone());
        captions.language = config.caption_language.clone();

        Self { config, llm, recognizer, captions: Arc::new(captions) }
    }

    /// Creates a pipeline with every collaborator supplied by the caller.
    pub fn with_collaborators(
        config: PipelineConfig,
        llm: Arc<dyn ChatCompletion>,
        recognizer: Arc<dyn RecognizerFactory>,
        captions: Arc<dyn CaptionProvider>,
    ) -> Self {
        Self { config, llm, recognizer, captions }
    }

    /// Runs the full pipeline and returns the generated notecards.
    ///
    /// # Errors
    ///
    /// Surfaces the originating stage's error unchanged. A run whose parse
    /// yields zero cards returns [`ArticleBiteError::NoCards`], which callers
    /// can detect with [`ArticleBiteError::is_no_cards`] to present a benign
    /// "nothing was generated" outcome.
    pub async fn run(
        &self,
        descriptor: SourceDescriptor,
        request: &GenerationRequest,
    ) -> Result<Vec<Notecard>> {
        Ok(self.generate_deck(descriptor, request).await?.cards)
    }

    /// Runs the full pipeline and returns the cards wrapped in a [`Deck`]
    /// that records the source label and request parameters.
    pub async fn generate_deck(
        &self,
        descriptor: SourceDescriptor,
        request: &GenerationRequest,
    ) -> Result<Deck> {
        request.validate()?;

        let label = descriptor.label();
        debug!(source = descriptor.kind().as_str(), "starting pipeline run");

        let text = self.acquire_text(&descriptor).await?;
        self.assemble_deck(&text, label, request).await
    }

    /// Generates a deck from already-acquired plain text, skipping source
    /// acquisition.
    pub async fn deck_from_text(&self, text: &str, request: &GenerationRequest) -> Result<Deck> {
        request.validate()?;
        let text = RawText::new(text)?;
        self.assemble_deck(&text, "text input".to_string(), request).await
    }

    /// Acquires and summarizes a source without generating questions.
    pub async fn summarize_source(&self, descriptor: &SourceDescriptor) -> Result<String> {
        let text = self.acquire_text(descriptor).await?;
        let chunks = chunk_text(text.as_str(), self.config.chunk_len);
        summarize_chunks(self.llm.as_ref(), &chunks).await
    }

    /// Generates the raw delimited question document for a prepared summary.
    pub async fn generate_document(
        &self,
        summary: &str,
        request: &GenerationRequest,
    ) -> Result<GeneratedDocument> {
        generate::generate_document(self.llm.as_ref(), summary, request).await
    }

    /// Dispatches the descriptor to its acquisition adapter.
    async fn acquire_text(&self, descriptor: &SourceDescriptor) -> Result<RawText> {
        match descriptor {
            SourceDescriptor::Url(url) => page::fetch_page_text(url, &self.config.acquire).await,
            SourceDescriptor::UploadedFile { bytes, mime_hint } => {
                recognize::recognize_upload(bytes, mime_hint.as_deref(), self.recognizer.as_ref())
                    .await
            }
            SourceDescriptor::YouTubeUrl(url) => {
                transcript::fetch_transcript(url, self.captions.as_ref()).await
            }
        }
    }

    /// Chunks, summarizes, generates, and parses acquired text into a deck.
    async fn assemble_deck(
        &self,
        text: &RawText,
        label: String,
        request: &GenerationRequest,
    ) -> Result<Deck> {
        let chunks = chunk_text(text.as_str(), self.config.chunk_len);
        debug!(chunks = chunks.len(), chars = text.char_count(), "chunked source text");

        let summary = summarize_chunks(self.llm.as_ref(), &chunks).await?;
        let document = generate::generate_document(self.llm.as_ref(), &summary, request).await?;
        let cards = parse_document(&document, request.question_type);

        if cards.is_empty() {
            return Err(ArticleBiteError::NoCards);
        }

        info!(cards = cards.len(), requested = request.count, "pipeline produced a deck");
        Ok(Deck::new(label, request.difficulty, request.question_type, cards))
    }
}

/// Convenience function: generate a deck from a web page with defaults.
///
/// # Example
///
/// ```no_run
/// use articlebite_core::{run_url, GenerationRequest};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let deck = run_url("https://example.com/article", &GenerationRequest::default()).await?;
///     println!("{} cards", deck.len());
///     Ok(())
/// }
/// ```
pub async fn run_url(url: &str, request: &GenerationRequest) -> Result<Deck> {
    let pipeline = NotecardPipeline::new(PipelineConfig::default())?;
    pipeline.generate_deck(SourceDescriptor::Url(url.to_string()), request).await
}

/// Convenience function: generate a deck from plain text with defaults.
pub async fn run_text(text: &str, request: &GenerationRequest) -> Result<Deck> {
    let pipeline = NotecardPipeline::new(PipelineConfig::default())?;
    pipeline.deck_from_text(text, request).await
}
