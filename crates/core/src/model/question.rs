use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{ChapterId, CourseId, QuestionId};

/// Fewest options a multiple-choice question may carry.
pub const MIN_OPTIONS: usize = 2;
/// Most options a multiple-choice question may carry.
pub const MAX_OPTIONS: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question must have between 2 and 4 options, got {count}")]
    OptionCount { count: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("correct index {index} is out of range for {count} options")]
    CorrectIndexOutOfRange { index: usize, count: usize },

    #[error("invalid difficulty: {0}")]
    InvalidDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Author-assigned difficulty tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
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
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(QuestionError::InvalidDifficulty(s.to_string())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question as authored in the bank.
///
/// `correct_index` always points into this question's own `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    course_id: CourseId,
    chapter_id: ChapterId,
    text: String,
    options: Vec<String>,
    correct_index: usize,
    explanation: Option<String>,
    difficulty: Difficulty,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or any option is blank, the option count is
    /// outside 2..=4, or `correct_index` does not point at an option.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: QuestionId,
        course_id: CourseId,
        chapter_id: ChapterId,
        text: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
        explanation: Option<String>,
        difficulty: Difficulty,
    ) -> Result<Self, QuestionError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        let count = options.len();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
            return Err(QuestionError::OptionCount { count });
        }
        if let Some(index) = options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { index });
        }
        if correct_index >= count {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
                count,
            });
        }

        let explanation = explanation
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        Ok(Self {
            id,
            course_id,
            chapter_id,
            text,
            options,
            correct_index,
            explanation,
            difficulty,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn chapter_id(&self) -> ChapterId {
        self.chapter_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// Text of the correct option.
    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Returns true if this question belongs to the given course chapter.
    #[must_use]
    pub fn belongs_to(&self, course_id: CourseId, chapter_id: ChapterId) -> bool {
        self.course_id == course_id && self.chapter_id == chapter_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(texts: &[&str]) -> Vec<String> {
        texts.iter().map(ToString::to_string).collect()
    }

    fn build(opts: Vec<String>, correct: usize) -> Result<Question, QuestionError> {
        Question::new(
            QuestionId::new(1),
            CourseId::new(1),
            ChapterId::new(1),
            "What is water?",
            opts,
            correct,
            None,
            Difficulty::Easy,
        )
    }

    #[test]
    fn valid_question_keeps_correct_option() {
        let q = build(options(&["H2O", "CO2", "NaCl"]), 0).unwrap();
        assert_eq!(q.correct_option(), "H2O");
        assert!(q.belongs_to(CourseId::new(1), ChapterId::new(1)));
        assert!(!q.belongs_to(CourseId::new(1), ChapterId::new(2)));
    }

    #[test]
    fn rejects_bad_option_counts() {
        let err = build(options(&["only"]), 0).unwrap_err();
        assert_eq!(err, QuestionError::OptionCount { count: 1 });

        let err = build(options(&["a", "b", "c", "d", "e"]), 0).unwrap_err();
        assert_eq!(err, QuestionError::OptionCount { count: 5 });
    }

    #[test]
    fn rejects_out_of_range_correct_index() {
        let err = build(options(&["a", "b"]), 2).unwrap_err();
        assert!(matches!(
            err,
            QuestionError::CorrectIndexOutOfRange { index: 2, count: 2 }
        ));
    }

    #[test]
    fn rejects_blank_option_and_text() {
        let err = build(options(&["a", "  "]), 0).unwrap_err();
        assert_eq!(err, QuestionError::EmptyOption { index: 1 });

        let err = Question::new(
            QuestionId::new(1),
            CourseId::new(1),
            ChapterId::new(1),
            "   ",
            options(&["a", "b"]),
            0,
            None,
            Difficulty::Hard,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyText);
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let q = Question::new(
            QuestionId::new(1),
            CourseId::new(1),
            ChapterId::new(1),
            "Q",
            options(&["a", "b"]),
            1,
            Some("  ".into()),
            Difficulty::Medium,
        )
        .unwrap();
        assert_eq!(q.explanation(), None);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("EASY".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Medium.to_string(), "medium");
    }
}
