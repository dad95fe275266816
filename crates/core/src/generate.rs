//! Question generation with bounded retry.
//!
//! The generator asks the completion endpoint for an exact number of items in
//! a line-oriented `key{n}=value` format, with a sentinel item appended after
//! the last real one. Models under- and over-produce, so each reply is
//! checked by scanning its item markers; a reply with the wrong item count or
//! an inconsistent index set is discarded and the call retried, up to three
//! attempts in total. Only this count check is retried. Transport failures
//! abort immediately.

use std::collections::BTreeSet;

use regex::Regex;
use tracing::{debug, warn};

use crate::llm::ChatCompletion;
use crate::{ArticleBiteError, GenerationRequest, QuestionType, Result};

/// Total completion calls the generator may spend on one request.
pub const MAX_ATTEMPTS: usize = 3;

/// Token budget for one generation reply.
const GENERATION_MAX_TOKENS: u32 = 4096;

/// Field value that marks the sentinel item.
pub(crate) const SENTINEL_VALUE: &str = "empty";

/// Raw delimited text accepted from the completion endpoint.
///
/// The item count and index sets have been checked, but individual values
/// are not guaranteed well-formed; parsing stays defensive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument(String);

impl GeneratedDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Generates the delimited question document for `summary`.
///
/// # Errors
///
/// Returns [`ArticleBiteError::Generation`] when [`MAX_ATTEMPTS`] replies in
/// a row fail the item-count check. Completion transport failures propagate
/// unchanged and are not retried.
pub async fn generate_document(
    llm: &dyn ChatCompletion,
    summary: &str,
    request: &GenerationRequest,
) -> Result<GeneratedDocument> {
    request.validate()?;

    let system_prompt = build_generation_prompt(request);
    let expected = request.count + 1;
    let mut last_reply = String::new();

    for attempt in 1..=MAX_ATTEMPTS {
        let reply = llm.complete(&system_prompt, summary, GENERATION_MAX_TOKENS).await?;

        if document_is_complete(&reply, expected) {
            debug!(attempt, items = expected, "generation accepted");
            return Ok(GeneratedDocument::new(reply));
        }

        warn!(
            attempt,
            produced = complete_item_count(&reply),
            expected,
            "generation rejected, item markers do not match"
        );
        last_reply = reply;
    }

    Err(ArticleBiteError::Generation {
        produced: complete_item_count(&last_reply),
        expected,
        attempts: MAX_ATTEMPTS,
    })
}

/// Builds the system instruction describing the exact output format.
///
/// The sentinel item is numbered one past the requested count and carries the
/// literal value `empty` in both fields, giving every reply a fixed final
/// marker to check for.
pub(crate) fn build_generation_prompt(request: &GenerationRequest) -> String {
    let count = request.count;
    let sentinel = count + 1;
    let mut prompt = format!(
        "You create study notecards from a summary. Write exactly {count} {} {} question{} \
         based only on the provided summary.\n\
         Output one line per field, numbering items from 1:\n\
         objective{{n}}=the question text\n",
        request.difficulty,
        request.question_type.phrase(),
        if count == 1 { "" } else { "s" },
    );

    if request.question_type.is_multiple_choice() {
        prompt.push_str(
            "choices{n}=exactly four answer options separated by |\n\
             correctAnswer{n}=the correct option, copied exactly from the choices line\n",
        );
    }

    prompt.push_str("answer{n}=the answer text or explanation\n");
    prompt.push_str(&format!(
        "Replace {{n}} with the item number and do not output any curly brace characters.\n\
         After the last question, append one final item numbered {sentinel} with exactly \
         these two lines and nothing else:\n\
         objective{sentinel}={SENTINEL_VALUE}\n\
         answer{sentinel}={SENTINEL_VALUE}\n"
    ));

    prompt
}

/// Whether `text` carries a consistent set of item markers for `expected`
/// items: `expected` objective markers and `expected` answer markers, whose
/// indices each cover exactly 1 through `expected` with no duplicates.
fn document_is_complete(text: &str, expected: usize) -> bool {
    let objectives = marker_indices(text, "objective");
    let answers = marker_indices(text, "answer");
    if objectives.len() != expected || answers.len() != expected {
        return false;
    }

    let want: BTreeSet<usize> = (1..=expected).collect();
    let objective_set: BTreeSet<usize> = objectives.iter().copied().collect();
    let answer_set: BTreeSet<usize> = answers.iter().copied().collect();

    objective_set == want && answer_set == want
}

/// Number of indices that carry both an objective and an answer marker.
fn complete_item_count(text: &str) -> usize {
    let objectives: BTreeSet<usize> = marker_indices(text, "objective").into_iter().collect();
    let answers: BTreeSet<usize> = marker_indices(text, "answer").into_iter().collect();
    objectives.intersection(&answers).count()
}

/// Extracts the numeric indices of every `key{n}=` marker in `text`.
///
/// The leading word boundary keeps `answer` markers from matching inside
/// `correctAnswer` lines.
fn marker_indices(text: &str, key: &str) -> Vec<usize> {
    let re = Regex::new(&format!(r"\b{key}(\d+)=")).unwrap();
    re.captures_iter(text).filter_map(|capture| capture[1].parse().ok()).collect()
}
