use std::sync::Arc;

use exam_core::model::{ExamId, ExamResult, ResultId, SubmittedAttempt, UserId};
use exam_core::scoring::score_attempt;
use exam_core::Clock;
use storage::repository::{ExamRepository, ResultRepository, Storage, UserRepository};

use super::service::{ExamSession, TickOutcome};
use crate::error::{SessionError, ValidationError};

/// Orchestrates the start → tick → submit loop over the repositories.
///
/// The session itself stays pure state; this service owns the clock and
/// turns finalized attempts into appended results.
#[derive(Clone)]
pub struct ExamLoopService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    exams: Arc<dyn ExamRepository>,
    results: Arc<dyn ResultRepository>,
}

impl ExamLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        users: Arc<dyn UserRepository>,
        exams: Arc<dyn ExamRepository>,
        results: Arc<dyn ResultRepository>,
    ) -> Self {
        Self {
            clock,
            users,
            exams,
            results,
        }
    }

    /// Wire the service to an existing storage aggregate.
    #[must_use]
    pub fn with_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.users),
            Arc::clone(&storage.exams),
            Arc::clone(&storage.results),
        )
    }

    /// Start an attempt: load and validate the student and the exam, then
    /// snapshot the exam into a fresh session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Validation` when the exam is unknown or
    /// inactive, or the user is unknown or not a student;
    /// `SessionError::Storage` on repository failures.
    pub async fn start_exam(
        &self,
        exam_id: ExamId,
        student_id: UserId,
    ) -> Result<ExamSession, SessionError> {
        let student = self
            .users
            .get_user(student_id)
            .await?
            .ok_or(ValidationError::UnknownStudent(student_id))?;
        if !student.role().is_student() {
            return Err(ValidationError::NotAStudent {
                user: student_id,
                role: student.role(),
            }
            .into());
        }

        let exam = self
            .exams
            .get_exam(exam_id)
            .await?
            .ok_or(ValidationError::UnknownExam(exam_id))?;
        if !exam.is_active() {
            return Err(ValidationError::ExamInactive(exam_id).into());
        }

        Ok(ExamSession::start(exam, &student, self.clock.now()))
    }

    /// Advance the session timer by one second.
    ///
    /// On expiry the forced submission is scored and appended, and the
    /// resulting record returned.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when scoring validation or the result append
    /// fails; the session itself is already `Submitted` at that point.
    pub async fn tick(
        &self,
        session: &mut ExamSession,
    ) -> Result<Option<ExamResult>, SessionError> {
        match session.tick(self.clock.now()) {
            TickOutcome::Expired(attempt) => {
                let result = self.finish(attempt, session.student_name()).await?;
                Ok(Some(result))
            }
            TickOutcome::Running { .. } | TickOutcome::Stopped => Ok(None),
        }
    }

    /// Confirm a pending submission: finalize, score, and append.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotConfirming`/`Finished` for phase misuse,
    /// `SessionError::Validation` when the exam vanished from the catalog,
    /// or `SessionError::Storage` when the append fails.
    pub async fn confirm_submit(
        &self,
        session: &mut ExamSession,
    ) -> Result<ExamResult, SessionError> {
        let attempt = session.confirm_submit(self.clock.now())?;
        self.finish(attempt, session.student_name()).await
    }

    /// Abandon the attempt; nothing is scored or stored.
    pub fn abandon(&self, session: &mut ExamSession) {
        session.exit();
    }

    async fn finish(
        &self,
        attempt: SubmittedAttempt,
        student_name: &str,
    ) -> Result<ExamResult, SessionError> {
        let exam_id = attempt.exam_id();
        let exam = self
            .exams
            .get_exam(exam_id)
            .await?
            .ok_or(ValidationError::UnknownExam(exam_id))?;

        // Result ids come from the submission timestamp; the reducer itself
        // stays pure and deterministic.
        let millis = attempt.submitted_at().timestamp_millis();
        let id = ResultId::new(u64::try_from(millis).unwrap_or_default());

        let result = score_attempt(&exam, &attempt, id, student_name);
        self.results.append_result(&result).await?;
        Ok(result)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use exam_core::model::QuestionId;
    use exam_core::time::{fixed_clock, fixed_now};
    use storage::seed::{
        self, GENERAL_KNOWLEDGE_EXAM, MATHEMATICS_EXAM, SAMPLE_STUDENT, SAMPLE_TEACHER,
    };

    async fn build_service(clock: Clock) -> (ExamLoopService, Storage) {
        let storage = seed::in_memory_with_sample_data().await.unwrap();
        (ExamLoopService::with_storage(clock, &storage), storage)
    }

    #[tokio::test]
    async fn start_validates_student_and_exam() {
        let (service, _storage) = build_service(fixed_clock()).await;

        let session = service
            .start_exam(GENERAL_KNOWLEDGE_EXAM, SAMPLE_STUDENT)
            .await
            .unwrap();
        assert_eq!(session.exam().id(), GENERAL_KNOWLEDGE_EXAM);
        assert_eq!(session.started_at(), fixed_now());

        let err = service
            .start_exam(ExamId::new(99), SAMPLE_STUDENT)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::UnknownExam(_))
        ));

        let err = service
            .start_exam(GENERAL_KNOWLEDGE_EXAM, SAMPLE_TEACHER)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::NotAStudent { .. })
        ));

        let err = service
            .start_exam(GENERAL_KNOWLEDGE_EXAM, UserId::new(42))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::UnknownStudent(_))
        ));
    }

    #[tokio::test]
    async fn inactive_exam_cannot_be_started() {
        let (service, storage) = build_service(fixed_clock()).await;

        let mut exam = storage
            .exams
            .get_exam(MATHEMATICS_EXAM)
            .await
            .unwrap()
            .unwrap();
        exam.set_active(false);
        storage.exams.upsert_exam(&exam).await.unwrap();

        let err = service
            .start_exam(MATHEMATICS_EXAM, SAMPLE_STUDENT)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::ExamInactive(_))
        ));
    }

    #[tokio::test]
    async fn confirmed_submission_is_scored_and_appended() {
        let mut clock = fixed_clock();
        clock.advance(Duration::days(60));
        let (service, storage) = build_service(clock).await;

        let mut session = service
            .start_exam(MATHEMATICS_EXAM, SAMPLE_STUDENT)
            .await
            .unwrap();
        session.select_answer(QuestionId::new(3), 0);
        session.request_submit();

        let result = service.confirm_submit(&mut session).await.unwrap();
        assert_eq!(result.score(), 5);
        assert_eq!(result.percentage(), 100.0);
        assert_eq!(result.student_name(), "John Smith");

        let stored = storage
            .results
            .results_for_exam(MATHEMATICS_EXAM)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id(), result.id());
    }

    #[tokio::test]
    async fn expiry_scores_only_the_answered_questions() {
        let mut clock = fixed_clock();
        clock.advance(Duration::days(61));
        let (service, storage) = build_service(clock).await;

        let mut session = service
            .start_exam(GENERAL_KNOWLEDGE_EXAM, SAMPLE_STUDENT)
            .await
            .unwrap();
        session.select_answer(QuestionId::new(1), 2);

        let mut forced = None;
        for _ in 0..session.exam().duration_seconds() {
            if let Some(result) = service.tick(&mut session).await.unwrap() {
                forced = Some(result);
                break;
            }
        }

        let result = forced.expect("timer should have expired");
        assert_eq!(result.score(), 5);
        assert_eq!(result.answers().len(), 1);

        // A dangling tick after expiry stays quiet.
        assert!(service.tick(&mut session).await.unwrap().is_none());

        let stored = storage.results.list_results().await.unwrap();
        assert_eq!(stored.len(), 2); // seed result + forced submission
    }

    #[tokio::test]
    async fn abandoned_attempt_leaves_no_result() {
        let mut clock = fixed_clock();
        clock.advance(Duration::days(62));
        let (service, storage) = build_service(clock).await;

        let mut session = service
            .start_exam(GENERAL_KNOWLEDGE_EXAM, SAMPLE_STUDENT)
            .await
            .unwrap();
        session.select_answer(QuestionId::new(1), 2);
        service.abandon(&mut session);

        assert!(service.tick(&mut session).await.unwrap().is_none());
        let stored = storage.results.list_results().await.unwrap();
        assert_eq!(stored.len(), 1); // only the seed result
    }
}
