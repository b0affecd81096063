use chrono::{DateTime, Utc};
use std::fmt;

use exam_core::model::{
    Exam, ExamAttempt, Question, QuestionId, SubmittedAttempt, User, UserId,
};

use super::progress::SessionProgress;
use crate::error::SessionError;

/// Remaining-time threshold below which views warn the student.
pub const LOW_TIME_SECONDS: u32 = 300;

/// Where a session is in its lifecycle.
///
/// `Submitted` and `Abandoned` are terminal; there is no pause/resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress,
    ConfirmingSubmit,
    Submitted,
    Abandoned,
}

impl SessionPhase {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Submitted | SessionPhase::Abandoned)
    }
}

/// Direction for step navigation between questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Previous,
    Next,
}

/// Outcome of one timer tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer still running; carries the seconds left.
    Running { remaining_seconds: u32 },
    /// Timer hit zero: the attempt was force-finalized with whatever
    /// answers were recorded, bypassing the confirmation step.
    Expired(SubmittedAttempt),
    /// The session already ended; a late tick changes nothing.
    Stopped,
}

/// One student's in-progress run through one exam.
///
/// Owns all mutation between start and submission: the answer map, the
/// flagged set, the navigation cursor, and the countdown. The exam is
/// snapshotted at start so its question set cannot change mid-attempt.
///
/// Every operation on an unsuitable phase or with an out-of-range index is
/// a silent no-op rather than an error; this state machine faces a closed,
/// trusted input surface (its own views), not the network.
pub struct ExamSession {
    exam: Exam,
    student_name: String,
    attempt: ExamAttempt,
    current: usize,
    remaining_seconds: u32,
    phase: SessionPhase,
}

impl ExamSession {
    /// Begin an attempt at `started_at` with the full time budget.
    #[must_use]
    pub fn start(exam: Exam, student: &User, started_at: DateTime<Utc>) -> Self {
        let attempt = ExamAttempt::new(exam.id(), student.id(), started_at);
        let remaining_seconds = exam.duration_seconds();
        Self {
            exam,
            student_name: student.name().to_owned(),
            attempt,
            current: 0,
            remaining_seconds,
            phase: SessionPhase::InProgress,
        }
    }

    #[must_use]
    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    #[must_use]
    pub fn student_id(&self) -> UserId {
        self.attempt.student_id()
    }

    #[must_use]
    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.attempt.started_at()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question under the navigation cursor.
    ///
    /// The cursor never leaves `[0, question_count)` and exams are never
    /// empty, so there is always a current question.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.exam.questions()[self.current]
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// True once less than five minutes remain.
    #[must_use]
    pub fn is_low_time(&self) -> bool {
        self.remaining_seconds < LOW_TIME_SECONDS
    }

    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<usize> {
        self.attempt.answer_for(question_id)
    }

    #[must_use]
    pub fn is_flagged(&self, question_id: QuestionId) -> bool {
        self.attempt.is_flagged(question_id)
    }

    /// Snapshot for progress bars and the question-navigator panel.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.exam.question_count(),
            answered: self.attempt.answered_count(),
            flagged: self.attempt.flagged_count(),
            current_index: self.current,
            remaining_seconds: self.remaining_seconds,
            is_low_time: self.is_low_time(),
            is_complete: self.phase.is_terminal(),
        }
    }

    /// Record or overwrite the answer for a question.
    ///
    /// Ignored when the session is not in progress, the question does not
    /// belong to this exam, or the option index is out of range. Never
    /// moves the navigation cursor.
    pub fn select_answer(&mut self, question_id: QuestionId, option_index: usize) {
        if self.phase != SessionPhase::InProgress {
            return;
        }
        let Some(question) = self.exam.find_question(question_id) else {
            return;
        };
        if !question.accepts_option(option_index) {
            return;
        }
        self.attempt.record_answer(question_id, option_index);
    }

    /// Step the cursor one question back or forward, clamped at both ends.
    pub fn navigate(&mut self, direction: NavDirection) {
        if self.phase != SessionPhase::InProgress {
            return;
        }
        match direction {
            NavDirection::Previous => {
                self.current = self.current.saturating_sub(1);
            }
            NavDirection::Next => {
                if self.current + 1 < self.exam.question_count() {
                    self.current += 1;
                }
            }
        }
    }

    /// Jump straight to a question; an out-of-range index is ignored.
    pub fn jump_to(&mut self, index: usize) {
        if self.phase != SessionPhase::InProgress {
            return;
        }
        if index < self.exam.question_count() {
            self.current = index;
        }
    }

    /// Flag or unflag a question for review; unknown questions are ignored.
    pub fn toggle_flag(&mut self, question_id: QuestionId) {
        if self.phase != SessionPhase::InProgress {
            return;
        }
        if self.exam.find_question(question_id).is_none() {
            return;
        }
        self.attempt.toggle_flag(question_id);
    }

    /// Advance the countdown by one second.
    ///
    /// Reaching zero force-finalizes the attempt at `now` — the single
    /// automatic transition in the session. Once the session has ended,
    /// further ticks report `Stopped` so a timer that outlives its session
    /// cannot corrupt anything.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.phase.is_terminal() {
            return TickOutcome::Stopped;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            TickOutcome::Expired(self.finalize(now))
        } else {
            TickOutcome::Running {
                remaining_seconds: self.remaining_seconds,
            }
        }
    }

    /// Ask to submit; moves to `ConfirmingSubmit`. No-op unless in progress.
    pub fn request_submit(&mut self) {
        if self.phase == SessionPhase::InProgress {
            self.phase = SessionPhase::ConfirmingSubmit;
        }
    }

    /// Back out of the confirmation step without touching any answers.
    pub fn cancel_submit(&mut self) {
        if self.phase == SessionPhase::ConfirmingSubmit {
            self.phase = SessionPhase::InProgress;
        }
    }

    /// Confirm a pending submission, finalizing the attempt at `now`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` if the session already ended, or
    /// `SessionError::NotConfirming` when no confirmation is pending.
    pub fn confirm_submit(&mut self, now: DateTime<Utc>) -> Result<SubmittedAttempt, SessionError> {
        match self.phase {
            SessionPhase::ConfirmingSubmit => Ok(self.finalize(now)),
            SessionPhase::InProgress => Err(SessionError::NotConfirming),
            SessionPhase::Submitted | SessionPhase::Abandoned => Err(SessionError::Finished),
        }
    }

    /// Abandon the attempt; no result will ever be produced from it.
    pub fn exit(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = SessionPhase::Abandoned;
        }
    }

    fn finalize(&mut self, now: DateTime<Utc>) -> SubmittedAttempt {
        self.phase = SessionPhase::Submitted;
        self.attempt.clone().finalize(now)
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("exam_id", &self.exam.id())
            .field("student_id", &self.attempt.student_id())
            .field("phase", &self.phase)
            .field("current", &self.current)
            .field("answered", &self.attempt.answered_count())
            .field("remaining_seconds", &self.remaining_seconds)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
