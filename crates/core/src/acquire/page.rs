//! Web page text acquisition.
//!
//! Fetches a URL and extracts the visible text of the rendered document:
//! non-content blocks like scripts and styles are stripped before parsing,
//! and the remaining text nodes are joined with normalized whitespace.

use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::acquire::AcquireConfig;
use crate::{ArticleBiteError, RawText, Result};

/// Fetches `url` and returns the page's visible text.
///
/// # Errors
///
/// Returns [`ArticleBiteError::InvalidSource`] for URLs that do not parse or
/// use a non-HTTP scheme, and [`ArticleBiteError::Acquisition`] when the
/// server responds with an error status or the page yields no text.
pub async fn fetch_page_text(url: &str, config: &AcquireConfig) -> Result<RawText> {
    let parsed_url =
        Url::parse(url).map_err(|e| ArticleBiteError::InvalidSource(format!("{url}: {e}")))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(ArticleBiteError::InvalidSource(format!(
            "unsupported scheme '{}' (expected http or https)",
            parsed_url.scheme()
        )));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(ArticleBiteError::Http)?;

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                ArticleBiteError::Timeout { timeout: config.timeout }
            } else {
                ArticleBiteError::Http(e)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ArticleBiteError::Acquisition(format!("HTTP {status} from {url}")));
    }

    let html = response.text().await?;
    let text = visible_text(&html);
    debug!(url, chars = text.len(), "extracted page text");

    RawText::new(text)
}

/// Extracts the visible text of an HTML document.
///
/// Script, style, noscript, template, and head content is removed before
/// parsing. Text nodes are trimmed and joined with single spaces.
pub(crate) fn visible_text(html: &str) -> String {
    let stripped = strip_hidden_blocks(html);
    let document = Html::parse_document(&stripped);

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());

    match body {
        Some(element) => join_fragments(element.text()),
        None => join_fragments(document.root_element().text()),
    }
}

fn strip_hidden_blocks(html: &str) -> String {
    let mut cleaned = html.to_string();
    for tag in ["script", "style", "noscript", "template", "head"] {
        let re = Regex::new(&format!(r"(?is)<{tag}(?:\s[^>]*)?>.*?</{tag}\s*>")).unwrap();
        cleaned = re.replace_all(&cleaned, " ").into_owned();
    }
    let comment_re = Regex::new(r"(?s)<!--.*?-->").unwrap();
    comment_re.replace_all(&cleaned, " ").into_owned()
}

fn join_fragments<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    fragments
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
