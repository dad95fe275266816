//! Sentence-aligned text chunking.
//!
//! Long source text is cut into chunks that each fit a completion call.
//! Splitting happens at sentence boundaries only, so no sentence is ever
//! divided across chunks, and chunk order follows the original text.
//!
//! # Example
//!
//! ```rust
//! use articlebite_core::chunk_text;
//!
//! let chunks = chunk_text("First point. Second point. Third point.", 20);
//! assert_eq!(chunks, vec!["First point.", "Second point.", "Third point."]);
//! ```

/// Default maximum chunk length in characters.
pub const DEFAULT_CHUNK_LEN: usize = 4000;

/// Splits `text` into trimmed, sentence-aligned chunks of at most `max_len`
/// characters.
///
/// Sentences are detected by a terminator (`.`, `!`, or `?`) followed by
/// whitespace. Sentences accumulate greedily into the current chunk; when the
/// next sentence would push past `max_len` the chunk is closed and a new one
/// begins. A single sentence longer than `max_len` becomes its own oversized
/// chunk rather than being split mid-sentence.
///
/// Whitespace-only input yields no chunks.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        if current.is_empty() {
            current.push_str(sentence);
            continue;
        }

        // +1 for the joining space.
        if current.chars().count() + 1 + sentence.chars().count() > max_len {
            chunks.push(std::mem::take(&mut current));
            current.push_str(sentence);
        } else {
            current.push(' ');
            current.push_str(sentence);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Splits text after each sentence terminator that is followed by whitespace.
/// The trailing fragment (with or without a terminator) is kept as the final
/// sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            let end = index + ch.len_utf8();
            if chars.peek().is_none_or(|(_, next)| next.is_whitespace()) {
                sentences.push(&text[start..end]);
                start = end;
            }
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
}
