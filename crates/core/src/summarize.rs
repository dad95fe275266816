//! Chunk summarization.
//!
//! Each chunk is condensed by one completion call, and the per-chunk
//! summaries are joined in chunk order into a single combined summary. Any
//! failing call aborts the whole pass; there is no partial-result fallback,
//! since question generation needs coverage of the full source.

use tracing::debug;

use crate::llm::ChatCompletion;
use crate::{ArticleBiteError, Result};

/// Fixed instruction sent with every chunk.
const SUMMARY_SYSTEM_PROMPT: &str =
    "Summarize the provided text into its key points. Keep every important fact, name, and \
     definition. Respond with the key points only.";

/// Token budget for one chunk summary.
const SUMMARY_MAX_TOKENS: u32 = 1024;

/// Separator between per-chunk summaries in the combined output.
const SUMMARY_SEPARATOR: &str = "\n\n";

/// Summarizes every chunk and joins the results in order.
///
/// # Errors
///
/// Returns [`ArticleBiteError::Summarization`] when any completion call fails
/// or when the combined summary is empty after trimming.
pub async fn summarize_chunks(llm: &dyn ChatCompletion, chunks: &[String]) -> Result<String> {
    let mut summaries = Vec::with_capacity(chunks.len());

    for (index, chunk) in chunks.iter().enumerate() {
        debug!(chunk = index + 1, total = chunks.len(), chars = chunk.len(), "summarizing chunk");

        let summary = llm
            .complete(SUMMARY_SYSTEM_PROMPT, chunk, SUMMARY_MAX_TOKENS)
            .await
            .map_err(|e| {
                ArticleBiteError::Summarization(format!(
                    "chunk {} of {}: {e}",
                    index + 1,
                    chunks.len()
                ))
            })?;

        summaries.push(summary.trim().to_string());
    }

    let combined = summaries.join(SUMMARY_SEPARATOR);
    if combined.trim().is_empty() {
        return Err(ArticleBiteError::Summarization(
            "summarization produced no content".to_string(),
        ));
    }

    Ok(combined)
}
