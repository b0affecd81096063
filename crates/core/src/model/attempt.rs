use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{ExamId, QuestionId, UserId};

/// One student's in-progress interaction with one exam.
///
/// Holds the partial answer map (unanswered questions are simply absent) and
/// the flagged-question set. Navigation, timing, and phase live in the
/// session layer; this is the record the session mutates and eventually
/// finalizes. Answers are kept in a `BTreeMap` so every walk over them is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamAttempt {
    exam_id: ExamId,
    student_id: UserId,
    started_at: DateTime<Utc>,
    answers: BTreeMap<QuestionId, usize>,
    flagged: BTreeSet<QuestionId>,
}

impl ExamAttempt {
    #[must_use]
    pub fn new(exam_id: ExamId, student_id: UserId, started_at: DateTime<Utc>) -> Self {
        Self {
            exam_id,
            student_id,
            started_at,
            answers: BTreeMap::new(),
            flagged: BTreeSet::new(),
        }
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
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Record or overwrite the selected option for a question.
    pub fn record_answer(&mut self, question_id: QuestionId, selected: usize) {
        self.answers.insert(question_id, selected);
    }

    /// Selected option index for a question, if any.
    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<usize> {
        self.answers.get(&question_id).copied()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Flag or unflag a question for review; its own inverse.
    pub fn toggle_flag(&mut self, question_id: QuestionId) {
        if !self.flagged.remove(&question_id) {
            self.flagged.insert(question_id);
        }
    }

    #[must_use]
    pub fn is_flagged(&self, question_id: QuestionId) -> bool {
        self.flagged.contains(&question_id)
    }

    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    /// Close the attempt at `submitted_at`, producing the scoring input.
    ///
    /// Flags are review aids only and do not survive submission.
    #[must_use]
    pub fn finalize(self, submitted_at: DateTime<Utc>) -> SubmittedAttempt {
        SubmittedAttempt {
            exam_id: self.exam_id,
            student_id: self.student_id,
            started_at: self.started_at,
            submitted_at,
            answers: self.answers,
        }
    }
}

/// A finalized attempt: the immutable input to the scoring reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedAttempt {
    exam_id: ExamId,
    student_id: UserId,
    started_at: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
    answers: BTreeMap<QuestionId, usize>,
}

impl SubmittedAttempt {
    #[must_use]
    pub fn exam_id(&self) -> ExamId {
        self.exam_id
    }

    #[must_use]
    pub fn student_id(&self) -> UserId {
        self.student_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Submitted answers in ascending question-id order.
    pub fn answers(&self) -> impl Iterator<Item = (QuestionId, usize)> + '_ {
        self.answers.iter().map(|(id, selected)| (*id, *selected))
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn build_attempt() -> ExamAttempt {
        ExamAttempt::new(ExamId::new(1), UserId::new(1), fixed_now())
    }

    #[test]
    fn records_and_overwrites_answers() {
        let mut attempt = build_attempt();
        let q = QuestionId::new(3);

        assert_eq!(attempt.answer_for(q), None);
        attempt.record_answer(q, 1);
        assert_eq!(attempt.answer_for(q), Some(1));
        attempt.record_answer(q, 2);
        assert_eq!(attempt.answer_for(q), Some(2));
        assert_eq!(attempt.answered_count(), 1);
    }

    #[test]
    fn toggle_flag_is_its_own_inverse() {
        let mut attempt = build_attempt();
        let q = QuestionId::new(5);

        assert!(!attempt.is_flagged(q));
        attempt.toggle_flag(q);
        assert!(attempt.is_flagged(q));
        attempt.toggle_flag(q);
        assert!(!attempt.is_flagged(q));
        assert_eq!(attempt.flagged_count(), 0);
    }

    #[test]
    fn finalize_preserves_answers_in_id_order() {
        let mut attempt = build_attempt();
        attempt.record_answer(QuestionId::new(9), 0);
        attempt.record_answer(QuestionId::new(2), 3);
        attempt.toggle_flag(QuestionId::new(2));

        let submitted_at = fixed_now() + chrono::Duration::minutes(10);
        let submitted = attempt.finalize(submitted_at);

        assert_eq!(submitted.submitted_at(), submitted_at);
        let order: Vec<QuestionId> = submitted.answers().map(|(id, _)| id).collect();
        assert_eq!(order, vec![QuestionId::new(2), QuestionId::new(9)]);
    }
}
