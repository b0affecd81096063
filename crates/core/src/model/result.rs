use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{ExamId, QuestionId, ResultId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamResultError {
    #[error("score ({score}) exceeds total points ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },
}

/// One submitted answer with its computed correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub selected_answer: usize,
    pub is_correct: bool,
}

/// Immutable scored outcome of a submitted attempt.
///
/// Created exactly once per submission and never mutated; the percentage is
/// derived from score and total points at construction (0 when the exam is
/// worth no points, never NaN).
#[derive(Debug, Clone, PartialEq)]
pub struct ExamResult {
    id: ResultId,
    exam_id: ExamId,
    student_id: UserId,
    student_name: String,
    score: u32,
    total_points: u32,
    percentage: f64,
    time_taken_minutes: u32,
    completed_at: DateTime<Utc>,
    answers: Vec<AnswerRecord>,
}

impl ExamResult {
    /// Build a result from already-scored parts.
    ///
    /// # Errors
    ///
    /// Returns `ExamResultError::ScoreExceedsTotal` if the score is larger
    /// than the exam's total points.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: ResultId,
        exam_id: ExamId,
        student_id: UserId,
        student_name: impl Into<String>,
        score: u32,
        total_points: u32,
        time_taken_minutes: u32,
        completed_at: DateTime<Utc>,
        answers: Vec<AnswerRecord>,
    ) -> Result<Self, ExamResultError> {
        if score > total_points {
            return Err(ExamResultError::ScoreExceedsTotal {
                score,
                total: total_points,
            });
        }

        Ok(Self::from_scoring(
            id,
            exam_id,
            student_id,
            student_name,
            score,
            total_points,
            time_taken_minutes,
            completed_at,
            answers,
        ))
    }

    // Infallible path for the scoring reducer, which sums points only over
    // questions of the exam being scored and so cannot exceed the total.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_scoring(
        id: ResultId,
        exam_id: ExamId,
        student_id: UserId,
        student_name: impl Into<String>,
        score: u32,
        total_points: u32,
        time_taken_minutes: u32,
        completed_at: DateTime<Utc>,
        answers: Vec<AnswerRecord>,
    ) -> Self {
        let percentage = if total_points == 0 {
            0.0
        } else {
            100.0 * f64::from(score) / f64::from(total_points)
        };

        Self {
            id,
            exam_id,
            student_id,
            student_name: student_name.into(),
            score,
            total_points,
            percentage,
            time_taken_minutes,
            completed_at,
            answers,
        }
    }

    #[must_use]
    pub fn id(&self) -> ResultId {
        self.id
    }

    #[must_use]
    pub fn exam_id(&self) -> ExamId {
        self.exam_id
    }

    #[must_use]
    pub fn student_id(&self) -> UserId {
        self.student_id
    }

    #[must_use]
    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    /// Score as a percentage of total points, in `[0, 100]`.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    #[must_use]
    pub fn time_taken_minutes(&self) -> u32 {
        self.time_taken_minutes
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Answer records in ascending question-id order.
    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }
}
