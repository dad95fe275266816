//! Notecard parsing.
//!
//! Turns the generator's delimited document into typed [`Notecard`]s. The
//! input comes from a language model, so the scanner is deliberately
//! tolerant: it reads the document line by line, associates fields by their
//! shared numeric index rather than by position, and silently drops any item
//! that does not assemble into a valid card. Parsing never fails; an
//! unusable document simply yields an empty list.
//!
//! # Example
//!
//! ```rust
//! use articlebite_core::{parse_document, GeneratedDocument, QuestionType};
//!
//! let document = GeneratedDocument::new(
//!     "objective1={What is water made of?}\n\
//!      answer1={Two hydrogen atoms and one oxygen atom.}\n\
//!      objective2=empty\n\
//!      answer2=empty\n",
//! );
//! let cards = parse_document(&document, QuestionType::ShortAnswer);
//! assert_eq!(cards.len(), 1);
//! assert_eq!(cards[0].objective, "What is water made of?");
//! ```

use std::collections::BTreeMap;

use regex::Regex;
use tracing::debug;

use crate::generate::{GeneratedDocument, SENTINEL_VALUE};
use crate::notecard::CHOICE_COUNT;
use crate::{Notecard, QuestionType};

/// Fields collected for one item index while scanning.
#[derive(Debug, Default)]
struct ItemFields {
    objective: Option<String>,
    choices: Option<String>,
    correct_answer: Option<String>,
    answer: Option<String>,
}

impl ItemFields {
    /// Marks the generator's end-of-output anchor, never a real card.
    fn is_sentinel(&self) -> bool {
        self.objective.as_deref() == Some(SENTINEL_VALUE)
            && self.answer.as_deref() == Some(SENTINEL_VALUE)
    }
}

/// Parses a generated document into notecards, in ascending item order.
///
/// Items missing a required field, multiple-choice items without exactly
/// four options or with a correct answer outside them, and the sentinel item
/// are all omitted from the result.
pub fn parse_document(document: &GeneratedDocument, question_type: QuestionType) -> Vec<Notecard> {
    let line_re =
        Regex::new(r"^\s*(objective|choices|correctAnswer|answer)(\d+)\s*=(.*)$").unwrap();

    let mut items: BTreeMap<usize, ItemFields> = BTreeMap::new();

    for line in document.as_str().lines() {
        let Some(capture) = line_re.captures(line) else {
            continue;
        };
        let Ok(index) = capture[2].parse::<usize>() else {
            continue;
        };

        let value = clean_value(&capture[3]);
        if value.is_empty() {
            continue;
        }

        let fields = items.entry(index).or_default();
        let slot = match &capture[1] {
            "objective" => &mut fields.objective,
            "choices" => &mut fields.choices,
            "correctAnswer" => &mut fields.correct_answer,
            _ => &mut fields.answer,
        };
        // First occurrence of a field wins.
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    let total = items.len();
    let cards: Vec<Notecard> = items
        .into_values()
        .filter(|fields| !fields.is_sentinel())
        .filter_map(|fields| assemble(fields, question_type))
        .collect();

    debug!(items = total, cards = cards.len(), "parsed generated document");
    cards
}

/// Renders notecards back into the delimited document form, sentinel
/// included. Inverse of [`parse_document`] for well-formed cards.
pub fn render_document(cards: &[Notecard]) -> GeneratedDocument {
    let mut text = String::new();

    for (position, card) in cards.iter().enumerate() {
        let n = position + 1;
        text.push_str(&format!("objective{n}={{{}}}\n", card.objective));
        if let Some(choices) = &card.choices {
            text.push_str(&format!("choices{n}={{{}}}\n", choices.join("|")));
        }
        if let Some(correct) = &card.correct_answer {
            text.push_str(&format!("correctAnswer{n}={{{correct}}}\n"));
        }
        text.push_str(&format!("answer{n}={{{}}}\n", card.explanation));
    }

    let sentinel = cards.len() + 1;
    text.push_str(&format!("objective{sentinel}={SENTINEL_VALUE}\n"));
    text.push_str(&format!("answer{sentinel}={SENTINEL_VALUE}\n"));

    GeneratedDocument::new(text)
}

/// Builds one card from collected fields, or drops the item.
fn assemble(fields: ItemFields, question_type: QuestionType) -> Option<Notecard> {
    let objective = fields.objective?;
    let answer = fields.answer?;

    if !question_type.is_multiple_choice() {
        return Some(Notecard::plain(objective, answer));
    }

    let choices: Vec<String> = fields
        .choices?
        .split('|')
        .map(|choice| choice.trim().to_string())
        .filter(|choice| !choice.is_empty())
        .collect();
    if choices.len() != CHOICE_COUNT {
        return None;
    }

    Notecard::multiple_choice(objective, answer, choices, fields.correct_answer?).ok()
}

/// Trims a field value and removes one optional pair of surrounding braces.
fn clean_value(raw: &str) -> String {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(trimmed);
    inner.trim().to_string()
}
