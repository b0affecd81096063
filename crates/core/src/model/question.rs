use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question must offer at least one option")]
    NoOptions,

    #[error("correct answer index {index} is out of range for {options} options")]
    CorrectAnswerOutOfRange { index: usize, options: usize },

    #[error("question must be worth at least one point")]
    ZeroPoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{label}")
    }
}

/// One multiple-choice question. Immutable once defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: usize,
    subject: String,
    difficulty: Difficulty,
    points: u32,
}

impl Question {
    /// Create a question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when there are no options, the correct-answer
    /// index falls outside them, or the question is worth zero points.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
        subject: impl Into<String>,
        difficulty: Difficulty,
        points: u32,
    ) -> Result<Self, QuestionError> {
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if correct_answer >= options.len() {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                index: correct_answer,
                options: options.len(),
            });
        }
        if points == 0 {
            return Err(QuestionError::ZeroPoints);
        }

        Ok(Self {
            id,
            prompt: prompt.into(),
            options,
            correct_answer,
            subject: subject.into(),
            difficulty,
            points,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index into `options` of the correct answer.
    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    /// True when `selected` is a valid option index for this question.
    #[must_use]
    pub fn accepts_option(&self, selected: usize) -> bool {
        selected < self.options.len()
    }

    /// True when `selected` picks the correct option.
    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_answer
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("option {i}")).collect()
    }

    #[test]
    fn builds_a_question() {
        let q = Question::new(
            QuestionId::new(1),
            "What is the capital of France?",
            options(4),
            2,
            "Geography",
            Difficulty::Easy,
            5,
        )
        .unwrap();

        assert_eq!(q.options().len(), 4);
        assert!(q.is_correct(2));
        assert!(!q.is_correct(0));
        assert!(q.accepts_option(3));
        assert!(!q.accepts_option(4));
    }

    #[test]
    fn rejects_empty_options() {
        let err = Question::new(
            QuestionId::new(1),
            "?",
            Vec::new(),
            0,
            "Misc",
            Difficulty::Easy,
            5,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::NoOptions);
    }

    #[test]
    fn rejects_out_of_range_correct_answer() {
        let err = Question::new(
            QuestionId::new(1),
            "?",
            options(3),
            3,
            "Misc",
            Difficulty::Medium,
            5,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            QuestionError::CorrectAnswerOutOfRange { index: 3, options: 3 }
        ));
    }

    #[test]
    fn rejects_zero_points() {
        let err = Question::new(
            QuestionId::new(1),
            "?",
            options(2),
            0,
            "Misc",
            Difficulty::Hard,
            0,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::ZeroPoints);
    }
}
