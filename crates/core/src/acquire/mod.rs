//! Text acquisition adapters.
//!
//! Each adapter turns one kind of [`SourceDescriptor`](crate::SourceDescriptor)
//! into [`RawText`](crate::RawText): [`page`] scrapes the visible text of a
//! web page, [`recognize`] runs uploaded files through text recognition, and
//! [`transcript`] pulls YouTube caption tracks. Adapters share the invariant
//! that empty extracted text is an acquisition failure, never a silent empty
//! result.

pub mod page;
pub mod recognize;
pub mod transcript;

/// HTTP settings shared by the network-backed adapters.
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent header sent with page and caption requests.
    pub user_agent: String,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; ArticleBite/1.0)".to_string(),
        }
    }
}
