//! Source descriptors and acquired text.
//!
//! A [`SourceDescriptor`] names where content comes from: a web page URL, an
//! uploaded file, or a YouTube link. Acquisition turns a descriptor into
//! [`RawText`], whose constructor enforces the minimum-content invariant so
//! that no later stage ever sees empty input.

use crate::{ArticleBiteError, Result};

/// Where the source content comes from.
///
/// A descriptor is created once per request and consumed by the matching
/// acquisition adapter; it is never shared across pipeline invocations.
#[derive(Debug, Clone)]
pub enum SourceDescriptor {
    /// A web page to scrape for visible text.
    Url(String),
    /// An uploaded file: image bytes routed through recognition, or a
    /// plain-text document when the mime hint says so.
    UploadedFile {
        bytes: Vec<u8>,
        mime_hint: Option<String>,
    },
    /// A YouTube link whose caption transcript supplies the text.
    YouTubeUrl(String),
}

impl SourceDescriptor {
    /// Short human-readable label for logs, deck metadata, and storage.
    pub fn label(&self) -> String {
        match self {
            SourceDescriptor::Url(url) => url.clone(),
            SourceDescriptor::UploadedFile { bytes, mime_hint } => {
                let hint = mime_hint.as_deref().unwrap_or("unknown type");
                format!("uploaded file ({}, {} bytes)", hint, bytes.len())
            }
            SourceDescriptor::YouTubeUrl(url) => url.clone(),
        }
    }

    /// The adapter family this descriptor dispatches to.
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceDescriptor::Url(_) => SourceKind::Page,
            SourceDescriptor::UploadedFile { .. } => SourceKind::Upload,
            SourceDescriptor::YouTubeUrl(_) => SourceKind::Transcript,
        }
    }
}

/// Acquisition adapter families, used for dispatch and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Page,
    Upload,
    Transcript,
}

impl SourceKind {
    /// Stable lowercase name, used in tracing fields and deck metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Page => "page",
            SourceKind::Upload => "upload",
            SourceKind::Transcript => "transcript",
        }
    }
}

/// Plain text produced by an acquisition adapter.
///
/// The constructor rejects text that is empty after trimming, so holding a
/// `RawText` is proof there is something to work with.
///
/// # Example
///
/// ```rust
/// use articlebite_core::RawText;
///
/// let text = RawText::new("Algebra is the study of symbols.").unwrap();
/// assert_eq!(text.as_str(), "Algebra is the study of symbols.");
/// assert!(RawText::new("   \n\t ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText(String);

impl RawText {
    /// Wraps acquired text, enforcing the minimum-content invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ArticleBiteError::Acquisition`] when the text is empty or
    /// whitespace-only.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ArticleBiteError::Acquisition(
                "source produced no text content".to_string(),
            ));
        }
        Ok(Self(text))
    }

    /// The acquired text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and yields the text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Character count of the acquired text.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_text_accepts_content() {
        let text = RawText::new("some words").unwrap();
        assert_eq!(text.as_str(), "some words");
        assert_eq!(text.char_count(), 10);
    }

    #[test]
    fn test_raw_text_rejects_empty() {
        assert!(matches!(RawText::new(""), Err(ArticleBiteError::Acquisition(_))));
        assert!(matches!(RawText::new("   \n\t  "), Err(ArticleBiteError::Acquisition(_))));
    }

    #[test]
    fn test_raw_text_preserves_surrounding_whitespace() {
        // The invariant is about emptiness, not normalization.
        let text = RawText::new("  padded  ").unwrap();
        assert_eq!(text.as_str(), "  padded  ");
    }

    #[test]
    fn test_descriptor_labels() {
        let url = SourceDescriptor::Url("https://example.com/a".to_string());
        assert_eq!(url.label(), "https://example.com/a");
        assert_eq!(url.kind(), SourceKind::Page);

        let upload = SourceDescriptor::UploadedFile {
            bytes: vec![1, 2, 3],
            mime_hint: Some("image/png".to_string()),
        };
        assert!(upload.label().contains("image/png"));
        assert!(upload.label().contains("3 bytes"));
        assert_eq!(upload.kind(), SourceKind::Upload);

        let video = SourceDescriptor::YouTubeUrl("https://youtu.be/dQw4w9WgXcQ".to_string());
        assert_eq!(video.kind(), SourceKind::Transcript);
    }

    #[test]
    fn test_upload_label_without_hint() {
        let upload = SourceDescriptor::UploadedFile { bytes: vec![], mime_hint: None };
        assert!(upload.label().contains("unknown type"));
    }
}
