//! Notecard and deck types.
//!
//! A [`Notecard`] is one question/answer study unit. Multiple-choice cards
//! carry exactly four answer options plus the correct one; every other
//! question format carries only the objective and its explanation. The
//! constructors enforce that shape, so a `Notecard` in hand is always
//! well-formed.
//!
//! # Example
//!
//! ```rust
//! use articlebite_core::Notecard;
//!
//! let card = Notecard::multiple_choice(
//!     "What is 2 + 2?",
//!     "Basic addition.",
//!     vec!["3".into(), "4".into(), "5".into(), "22".into()],
//!     "4",
//! )
//! .unwrap();
//! assert!(card.is_multiple_choice());
//! ```

use serde::{Deserialize, Serialize};

use crate::{ArticleBiteError, Difficulty, QuestionType, Result};

/// Number of answer options a multiple-choice card carries.
pub const CHOICE_COUNT: usize = 4;

/// A single question/answer study unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notecard {
    /// The question or prompt shown on the front of the card.
    pub objective: String,
    /// The answer or explanation shown on the back.
    pub explanation: String,
    /// Answer options, present only for multiple-choice cards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    /// The correct option, present only for multiple-choice cards. Always an
    /// exact member of `choices`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

impl Notecard {
    /// Builds a card for the essay, short-answer, and true/false formats.
    pub fn plain(objective: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            objective: objective.into(),
            explanation: explanation.into(),
            choices: None,
            correct_answer: None,
        }
    }

    /// Builds a multiple-choice card, validating the options.
    ///
    /// # Errors
    ///
    /// Returns [`ArticleBiteError::InvalidRequest`] when `choices` does not
    /// hold exactly [`CHOICE_COUNT`] entries or `correct_answer` is not one
    /// of them.
    pub fn multiple_choice(
        objective: impl Into<String>,
        explanation: impl Into<String>,
        choices: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self> {
        let correct_answer = correct_answer.into();
        if choices.len() != CHOICE_COUNT {
            return Err(ArticleBiteError::InvalidRequest(format!(
                "multiple-choice card needs exactly {CHOICE_COUNT} choices, got {}",
                choices.len()
            )));
        }
        if !choices.iter().any(|choice| choice == &correct_answer) {
            return Err(ArticleBiteError::InvalidRequest(format!(
                "correct answer '{correct_answer}' is not one of the choices"
            )));
        }
        Ok(Self {
            objective: objective.into(),
            explanation: explanation.into(),
            choices: Some(choices),
            correct_answer: Some(correct_answer),
        })
    }

    /// Whether this card carries answer options.
    pub fn is_multiple_choice(&self) -> bool {
        self.choices.is_some()
    }
}

/// An ordered set of notecards produced by one pipeline run, together with
/// the request parameters and a label for the source they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    /// Human-readable label of the acquired source.
    pub source: String,
    /// Difficulty the cards were generated at.
    pub difficulty: Difficulty,
    /// Question format of the cards.
    pub question_type: QuestionType,
    /// The cards, in generation order.
    pub cards: Vec<Notecard>,
}

impl Deck {
    pub fn new(
        source: impl Into<String>,
        difficulty: Difficulty,
        question_type: QuestionType,
        cards: Vec<Notecard>,
    ) -> Self {
        Self { source: source.into(), difficulty, question_type, cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Pretty-printed JSON rendering of the deck.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text rendering, one numbered card per block.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Source: {}\n", self.source));
        out.push_str(&format!(
            "{} {} cards ({})\n",
            self.cards.len(),
            self.question_type.phrase(),
            self.difficulty
        ));

        for (position, card) in self.cards.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("{}. {}\n", position + 1, card.objective));
            if let Some(choices) = &card.choices {
                for (option, choice) in choices.iter().enumerate() {
                    let letter = (b'A' + option as u8) as char;
                    out.push_str(&format!("   {letter}) {choice}\n"));
                }
            }
            if let Some(correct) = &card.correct_answer {
                out.push_str(&format!("   Correct: {correct}\n"));
            }
            out.push_str(&format!("   Answer: {}\n", card.explanation));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_choices() -> Vec<String> {
        vec!["Paris".into(), "Lyon".into(), "Nice".into(), "Lille".into()]
    }

    #[test]
    fn test_plain_card_has_no_options() {
        let card = Notecard::plain("Define osmosis.", "Diffusion of water across a membrane.");
        assert!(!card.is_multiple_choice());
        assert!(card.choices.is_none());
        assert!(card.correct_answer.is_none());
    }

    #[test]
    fn test_multiple_choice_validates_membership() {
        let card = Notecard::multiple_choice(
            "Capital of France?",
            "Paris has been the capital since 987.",
            sample_choices(),
            "Paris",
        )
        .unwrap();
        assert!(card.is_multiple_choice());
        assert_eq!(card.correct_answer.as_deref(), Some("Paris"));

        let missing = Notecard::multiple_choice("Q", "A", sample_choices(), "Marseille");
        assert!(matches!(missing, Err(ArticleBiteError::InvalidRequest(_))));
    }

    #[test]
    fn test_multiple_choice_requires_four_options() {
        let short = Notecard::multiple_choice(
            "Q",
            "A",
            vec!["yes".into(), "no".into()],
            "yes",
        );
        assert!(matches!(short, Err(ArticleBiteError::InvalidRequest(_))));
    }

    #[test]
    fn test_card_json_omits_absent_options() {
        let card = Notecard::plain("Q", "A");
        let json = serde_json::to_string(&card).unwrap();
        assert!(!json.contains("choices"));
        assert!(!json.contains("correctAnswer"));
    }

    #[test]
    fn test_deck_text_rendering() {
        let deck = Deck::new(
            "https://example.com/article",
            Difficulty::Medium,
            QuestionType::MultipleChoice,
            vec![Notecard::multiple_choice(
                "Capital of France?",
                "Paris has been the capital since 987.",
                sample_choices(),
                "Paris",
            )
            .unwrap()],
        );

        let text = deck.to_text();
        assert!(text.contains("1. Capital of France?"));
        assert!(text.contains("A) Paris"));
        assert!(text.contains("D) Lille"));
        assert!(text.contains("Correct: Paris"));
        assert!(text.contains("Answer: Paris has been the capital since 987."));
    }

    #[test]
    fn test_deck_json_round_trip() {
        let deck = Deck::new(
            "upload",
            Difficulty::Hard,
            QuestionType::Essay,
            vec![Notecard::plain("Q", "A")],
        );
        let parsed: Deck = serde_json::from_str(&deck.to_json().unwrap()).unwrap();
        assert_eq!(parsed, deck);
    }
}
