use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::model::{ExamId, Question, QuestionId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error("exam must contain at least one question")]
    NoQuestions,

    #[error("exam duration must be at least one minute")]
    ZeroDuration,

    #[error("duplicate question id {0} in exam")]
    DuplicateQuestion(QuestionId),
}

/// A published exam: an ordered question set plus timing and visibility.
///
/// `total_points` is computed from the questions at construction, so the
/// sum invariant holds for the exam's whole lifetime. The question set is
/// immutable; only the `is_active` visibility toggle may change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exam {
    id: ExamId,
    title: String,
    description: String,
    subject: String,
    duration_minutes: u32,
    questions: Vec<Question>,
    total_points: u32,
    is_active: bool,
    created_by: UserId,
    created_at: DateTime<Utc>,
}

impl Exam {
    /// Create an exam from an ordered question list.
    ///
    /// # Errors
    ///
    /// Returns `ExamError` for an empty question list, a zero duration, or
    /// duplicate question ids.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ExamId,
        title: impl Into<String>,
        description: impl Into<String>,
        subject: impl Into<String>,
        duration_minutes: u32,
        questions: Vec<Question>,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ExamError> {
        if questions.is_empty() {
            return Err(ExamError::NoQuestions);
        }
        if duration_minutes == 0 {
            return Err(ExamError::ZeroDuration);
        }

        let mut seen = BTreeSet::new();
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(ExamError::DuplicateQuestion(question.id()));
            }
        }

        let total_points = questions.iter().map(Question::points).sum();

        Ok(Self {
            id,
            title: title.into(),
            description: description.into(),
            subject: subject.into(),
            duration_minutes,
            questions,
            total_points,
            is_active: true,
            created_by,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> ExamId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Full time budget for an attempt, in seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_minutes * 60
    }

    /// Questions in navigation order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Question at a navigation position, if the index is valid.
    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Look up a question by id.
    #[must_use]
    pub fn find_question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Toggle whether students can see and start this exam.
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    #[must_use]
    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
