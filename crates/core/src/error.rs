//! Error types for ArticleBite operations.
//!
//! This module defines the main error type [`ArticleBiteError`] which represents
//! all possible errors that can occur while acquiring source text, summarizing
//! it, generating questions, and assembling notecards.
//!
//! # Example
//!
//! ```rust
//! use articlebite_core::{ArticleBiteError, Result};
//!
//! fn require_text(text: &str) -> Result<&str> {
//!     if text.trim().is_empty() {
//!         return Err(ArticleBiteError::Acquisition("source yielded no text".to_string()));
//!     }
//!     Ok(text)
//! }
//! ```

use thiserror::Error;

/// Main error type for the notecard generation pipeline.
///
/// Every pipeline stage fails fast: the first error aborts the remaining
/// stages and is surfaced to the caller unchanged. The one exception to
/// "no retries" is question generation, which retries on an item-count
/// mismatch before giving up with [`ArticleBiteError::Generation`].
///
/// The zero-card outcome [`ArticleBiteError::NoCards`] is deliberately part of
/// this enum even though it is not a system fault: callers use
/// [`ArticleBiteError::is_no_cards`] to show a "nothing was generated" message
/// instead of an error page.
#[derive(Error, Debug)]
pub enum ArticleBiteError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, connection issues, and other
    /// transport-level problems from the fetch layer.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Malformed source descriptor.
    ///
    /// Returned when a URL cannot be parsed, or a YouTube URL carries no
    /// recognizable 11-character video identifier.
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// Source acquisition failure.
    ///
    /// The source was unreachable or unsupported, or the extracted text was
    /// empty after trimming. Downstream stages never receive empty input.
    #[error("Failed to acquire source text: {0}")]
    Acquisition(String),

    /// The language-model completion service failed.
    ///
    /// Covers transport faults, non-success status codes, and unparseable
    /// completion responses. During the summarize stage these are wrapped
    /// into [`ArticleBiteError::Summarization`] instead.
    #[error("Completion service failed ({provider}): {message}")]
    Completion { provider: String, message: String },

    /// Summarization failure.
    ///
    /// A per-chunk completion call failed, or the combined summary was empty
    /// after trimming. There is no partial-result fallback.
    #[error("Summarization failed: {0}")]
    Summarization(String),

    /// Question generation exhausted its retry budget.
    ///
    /// The generator accepts a response only when it contains every expected
    /// item exactly once (the requested items plus the sentinel). `produced`
    /// is the number of complete items found in the final attempt.
    #[error("Question generation yielded {produced} of {expected} expected items after {attempts} attempts")]
    Generation { produced: usize, expected: usize, attempts: usize },

    /// Parsing the generated document produced zero notecards.
    ///
    /// This is a valid outcome, not a system fault: the source material did
    /// not yield any usable question/answer pairs. Callers should present a
    /// "nothing was generated" message rather than a failure.
    #[error("No notecards could be generated from the provided content")]
    NoCards,

    /// Generation request validation failure.
    ///
    /// Returned before any pipeline stage runs, e.g. for a requested question
    /// count of zero.
    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),

    /// Serialization errors.
    ///
    /// Wraps serde_json errors from deck output conversion.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// File I/O errors.
    ///
    /// Wraps standard I/O errors for uploaded-file access.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArticleBiteError {
    /// Returns `true` for the benign zero-card outcome.
    ///
    /// Presentation layers use this to distinguish "the content had nothing
    /// usable in it" from a hard service fault.
    pub fn is_no_cards(&self) -> bool {
        matches!(self, ArticleBiteError::NoCards)
    }
}

/// Result type alias for ArticleBiteError.
///
/// This is a convenience alias for `std::result::Result<T, ArticleBiteError>`.
pub type Result<T> = std::result::Result<T, ArticleBiteError>;
