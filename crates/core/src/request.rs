//! Notecard generation requests.
//!
//! A [`GenerationRequest`] captures the caller's intent for one pipeline run:
//! how many cards to produce, at which difficulty, and in which question
//! format. Construction validates the request so downstream stages can rely
//! on a sane card count.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ArticleBiteError, Result};

/// Difficulty level requested for generated questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Lowercase token used in prompts and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ArticleBiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ArticleBiteError::InvalidRequest(format!(
                "unknown difficulty '{other}' (expected easy, medium, or hard)"
            ))),
        }
    }
}

/// Question format requested for generated cards.
///
/// Multiple choice is the only format that carries answer options; the other
/// formats produce an objective and a free-form answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    Essay,
    ShortAnswer,
    TrueFalse,
}

impl QuestionType {
    /// Whether cards of this type carry a choices list and a correct answer.
    pub fn is_multiple_choice(&self) -> bool {
        matches!(self, QuestionType::MultipleChoice)
    }

    /// Kebab-case token, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::Essay => "essay",
            QuestionType::ShortAnswer => "short-answer",
            QuestionType::TrueFalse => "true-false",
        }
    }

    /// Natural-language phrase used when describing the format in prompts.
    pub fn phrase(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple choice",
            QuestionType::Essay => "essay",
            QuestionType::ShortAnswer => "short answer",
            QuestionType::TrueFalse => "true/false",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = ArticleBiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "multiple-choice" | "multiplechoice" | "mc" => Ok(QuestionType::MultipleChoice),
            "essay" => Ok(QuestionType::Essay),
            "short-answer" | "shortanswer" => Ok(QuestionType::ShortAnswer),
            "true-false" | "truefalse" | "true/false" => Ok(QuestionType::TrueFalse),
            other => Err(ArticleBiteError::InvalidRequest(format!(
                "unknown question type '{other}' (expected multiple-choice, essay, short-answer, or true-false)"
            ))),
        }
    }
}

/// Parameters for a single notecard generation run.
///
/// # Example
///
/// ```rust
/// use articlebite_core::{Difficulty, GenerationRequest, QuestionType};
///
/// let request = GenerationRequest::new(5, Difficulty::Hard, QuestionType::Essay).unwrap();
/// assert_eq!(request.count, 5);
/// assert!(GenerationRequest::new(0, Difficulty::Easy, QuestionType::Essay).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Number of notecards to produce. At least 1.
    pub count: usize,
    /// Difficulty level for the generated questions.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Question format for the generated cards.
    #[serde(default)]
    pub question_type: QuestionType,
}

impl GenerationRequest {
    /// Builds a validated request.
    ///
    /// # Errors
    ///
    /// Returns [`ArticleBiteError::InvalidRequest`] when `count` is zero.
    pub fn new(count: usize, difficulty: Difficulty, question_type: QuestionType) -> Result<Self> {
        let request = Self { count, difficulty, question_type };
        request.validate()?;
        Ok(request)
    }

    /// Checks the card count. Useful for requests built from deserialized
    /// input rather than [`GenerationRequest::new`].
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(ArticleBiteError::InvalidRequest(
                "card count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            count: 5,
            difficulty: Difficulty::default(),
            question_type: QuestionType::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_difficulty_round_trip() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let parsed: Difficulty = difficulty.to_string().parse().unwrap();
            assert_eq!(parsed, difficulty);
        }
    }

    #[test]
    fn test_difficulty_parse_is_case_insensitive() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!(" bogus ".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_question_type_round_trip() {
        for question_type in [
            QuestionType::MultipleChoice,
            QuestionType::Essay,
            QuestionType::ShortAnswer,
            QuestionType::TrueFalse,
        ] {
            let parsed: QuestionType = question_type.to_string().parse().unwrap();
            assert_eq!(parsed, question_type);
        }
    }

    #[rstest]
    #[case("mc", QuestionType::MultipleChoice)]
    #[case("multiplechoice", QuestionType::MultipleChoice)]
    #[case("Multiple-Choice", QuestionType::MultipleChoice)]
    #[case(" essay ", QuestionType::Essay)]
    #[case("short_answer", QuestionType::ShortAnswer)]
    #[case("shortanswer", QuestionType::ShortAnswer)]
    #[case("true/false", QuestionType::TrueFalse)]
    #[case("truefalse", QuestionType::TrueFalse)]
    fn test_question_type_accepts_aliases(#[case] input: &str, #[case] expected: QuestionType) {
        assert_eq!(input.parse::<QuestionType>().unwrap(), expected);
    }

    #[test]
    fn test_only_multiple_choice_carries_options() {
        assert!(QuestionType::MultipleChoice.is_multiple_choice());
        assert!(!QuestionType::Essay.is_multiple_choice());
        assert!(!QuestionType::ShortAnswer.is_multiple_choice());
        assert!(!QuestionType::TrueFalse.is_multiple_choice());
    }

    #[test]
    fn test_any_positive_count_is_valid() {
        assert!(GenerationRequest::new(1, Difficulty::Easy, QuestionType::Essay).is_ok());
        assert!(GenerationRequest::new(60, Difficulty::Medium, QuestionType::Essay).is_ok());
        assert!(GenerationRequest::new(500, Difficulty::Hard, QuestionType::MultipleChoice).is_ok());

        let zero = GenerationRequest::new(0, Difficulty::Easy, QuestionType::Essay);
        assert!(matches!(zero, Err(ArticleBiteError::InvalidRequest(_))));
    }

    #[test]
    fn test_request_serde_defaults() {
        let request: GenerationRequest = serde_json::from_str(r#"{"count": 3}"#).unwrap();
        assert_eq!(request.count, 3);
        assert_eq!(request.difficulty, Difficulty::Medium);
        assert_eq!(request.question_type, QuestionType::MultipleChoice);
    }
}
