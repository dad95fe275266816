//! YouTube transcript acquisition.
//!
//! Pulls the caption track of a video and joins its fragments into plain
//! text. The video identifier is recognized in the usual URL shapes
//! (`watch?v=`, `youtu.be/`, `embed/`, `shorts/`, `live/`); anything else is
//! an invalid source.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::acquire::AcquireConfig;
use crate::{ArticleBiteError, RawText, Result};

/// Extracts the 11-character video identifier from a YouTube URL.
///
/// # Errors
///
/// Returns [`ArticleBiteError::InvalidSource`] when no identifier is found.
///
/// # Example
///
/// ```rust
/// use articlebite_core::acquire::transcript::extract_video_id;
///
/// let id = extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap();
/// assert_eq!(id, "dQw4w9WgXcQ");
/// assert!(extract_video_id("https://example.com/notavideo").is_err());
/// ```
pub fn extract_video_id(url: &str) -> Result<String> {
    let re = Regex::new(
        r"(?:youtube\.com/(?:watch\?[^#\s]*v=|embed/|shorts/|live/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .unwrap();

    re.captures(url)
        .map(|capture| capture[1].to_string())
        .ok_or_else(|| {
            ArticleBiteError::InvalidSource(format!("no YouTube video id found in '{url}'"))
        })
}

/// Supplies the ordered caption fragments of a video.
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    async fn fetch_captions(&self, video_id: &str) -> Result<Vec<String>>;
}

/// Acquires the transcript text for a YouTube URL.
///
/// Caption fragments are trimmed and joined with single spaces, preserving
/// their original order.
pub async fn fetch_transcript(url: &str, provider: &dyn CaptionProvider) -> Result<RawText> {
    let video_id = extract_video_id(url)?;
    let fragments = provider.fetch_captions(&video_id).await?;

    if fragments.is_empty() {
        return Err(ArticleBiteError::Acquisition(format!(
            "no captions available for video {video_id}"
        )));
    }

    let joined = fragments
        .iter()
        .map(|fragment| fragment.trim())
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    debug!(video_id, fragments = fragments.len(), "fetched caption transcript");
    RawText::new(joined)
}

/// Caption provider backed by the public timedtext endpoint.
#[derive(Debug, Clone)]
pub struct TimedTextCaptions {
    config: AcquireConfig,
    /// Caption language code requested from the endpoint.
    pub language: String,
}

impl TimedTextCaptions {
    pub fn new(config: AcquireConfig) -> Self {
        Self { config, language: "en".to_string() }
    }
}

#[async_trait]
impl CaptionProvider for TimedTextCaptions {
    async fn fetch_captions(&self, video_id: &str) -> Result<Vec<String>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout))
            .build()
            .map_err(ArticleBiteError::Http)?;

        let url = format!(
            "https://video.google.com/timedtext?lang={}&v={video_id}",
            self.language
        );
        let response = client
            .get(&url)
            .header("User-Agent", &self.config.user_agent)
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
            return Err(ArticleBiteError::Acquisition(format!(
                "caption request for {video_id} answered HTTP {status}"
            )));
        }

        let body = response.text().await?;
        Ok(parse_caption_xml(&body))
    }
}

/// Pulls the text content out of a timedtext XML document.
fn parse_caption_xml(xml: &str) -> Vec<String> {
    let re = Regex::new(r"(?s)<text[^>]*>(.*?)</text>").unwrap();
    re.captures_iter(xml)
        .map(|capture| decode_entities(&capture[1]).trim().to_string())
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
