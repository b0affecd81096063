//! Pure reducer from a finalized attempt to an [`ExamResult`].

use crate::model::{AnswerRecord, Exam, ExamResult, ResultId, SubmittedAttempt};

/// Score a finalized attempt against its exam definition.
///
/// Pure and idempotent: the result id and student name are supplied by the
/// caller, so two calls on the same `(exam, attempt)` pair produce identical
/// results. Semantics:
///
/// - one answer record per submitted answer, in question-id order;
/// - an answer is correct iff its question exists in the exam and the
///   selected index matches the question's correct answer — an answer for a
///   question the exam does not contain is recorded as incorrect;
/// - unanswered questions contribute nothing;
/// - percentage is 0 when the exam is worth no points;
/// - elapsed time is rounded to whole minutes, clamped at zero.
#[must_use]
pub fn score_attempt(
    exam: &Exam,
    attempt: &SubmittedAttempt,
    id: ResultId,
    student_name: impl Into<String>,
) -> ExamResult {
    let mut score = 0_u32;
    let mut answers = Vec::with_capacity(attempt.answered_count());

    for (question_id, selected) in attempt.answers() {
        let question = exam.find_question(question_id);
        let is_correct = question.is_some_and(|q| q.is_correct(selected));
        if is_correct {
            if let Some(question) = question {
                score = score.saturating_add(question.points());
            }
        }
        answers.push(AnswerRecord {
            question_id,
            selected_answer: selected,
            is_correct,
        });
    }

    ExamResult::from_scoring(
        id,
        exam.id(),
        attempt.student_id(),
        student_name,
        score,
        exam.total_points(),
        elapsed_minutes(attempt),
        attempt.submitted_at(),
        answers,
    )
}

/// Whole minutes between start and submission, rounded, never negative.
fn elapsed_minutes(attempt: &SubmittedAttempt) -> u32 {
    let millis = (attempt.submitted_at() - attempt.started_at()).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let minutes = (millis as f64 / 60_000.0).round() as i64;
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, ExamAttempt, ExamId, Question, QuestionId, UserId};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn build_question(id: u64, correct: usize, points: u32) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id}?"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
            "General",
            Difficulty::Easy,
            points,
        )
        .unwrap()
    }

    /// Two questions worth 5 and 10 points (total 15).
    fn build_exam() -> Exam {
        Exam::new(
            ExamId::new(1),
            "General Knowledge Quiz",
            "A comprehensive quiz covering various subjects",
            "General",
            30,
            vec![build_question(1, 2, 5), build_question(2, 1, 10)],
            UserId::new(2),
            fixed_now(),
        )
        .unwrap()
    }

    fn build_attempt() -> ExamAttempt {
        ExamAttempt::new(ExamId::new(1), UserId::new(1), fixed_now())
    }

    #[test]
    fn partial_attempt_scores_only_answered_questions() {
        let exam = build_exam();
        let mut attempt = build_attempt();
        attempt.record_answer(QuestionId::new(1), 2);
        let submitted = attempt.finalize(fixed_now() + Duration::minutes(10));

        let result = score_attempt(&exam, &submitted, ResultId::new(100), "John Smith");

        assert_eq!(result.score(), 5);
        assert!((result.percentage() - 100.0 * 5.0 / 15.0).abs() < 1e-9);
        assert_eq!(result.answers().len(), 1);
        assert!(result.answers()[0].is_correct);
        assert_eq!(result.time_taken_minutes(), 10);
    }

    #[test]
    fn perfect_attempt_scores_full_marks() {
        let exam = build_exam();
        let mut attempt = build_attempt();
        attempt.record_answer(QuestionId::new(1), 2);
        attempt.record_answer(QuestionId::new(2), 1);
        let submitted = attempt.finalize(fixed_now() + Duration::minutes(12));

        let result = score_attempt(&exam, &submitted, ResultId::new(100), "John Smith");

        assert_eq!(result.score(), exam.total_points());
        assert_eq!(result.percentage(), 100.0);
        assert!(result.answers().iter().all(|a| a.is_correct));
    }

    #[test]
    fn empty_attempt_scores_zero() {
        let exam = build_exam();
        let submitted = build_attempt().finalize(fixed_now() + Duration::minutes(1));

        let result = score_attempt(&exam, &submitted, ResultId::new(100), "John Smith");

        assert_eq!(result.score(), 0);
        assert_eq!(result.percentage(), 0.0);
        assert!(result.answers().is_empty());
    }

    #[test]
    fn wrong_answers_earn_nothing_but_are_recorded() {
        let exam = build_exam();
        let mut attempt = build_attempt();
        attempt.record_answer(QuestionId::new(1), 0);
        attempt.record_answer(QuestionId::new(2), 1);
        let submitted = attempt.finalize(fixed_now() + Duration::minutes(5));

        let result = score_attempt(&exam, &submitted, ResultId::new(100), "John Smith");

        assert_eq!(result.score(), 10);
        assert_eq!(result.answers().len(), 2);
        assert!(!result.answers()[0].is_correct);
        assert!(result.answers()[1].is_correct);
    }

    #[test]
    fn answer_for_unknown_question_is_incorrect_not_an_error() {
        let exam = build_exam();
        let mut attempt = build_attempt();
        attempt.record_answer(QuestionId::new(99), 0);
        let submitted = attempt.finalize(fixed_now() + Duration::minutes(5));

        let result = score_attempt(&exam, &submitted, ResultId::new(100), "John Smith");

        assert_eq!(result.score(), 0);
        assert_eq!(result.answers().len(), 1);
        assert!(!result.answers()[0].is_correct);
    }

    #[test]
    fn score_never_exceeds_total_points() {
        let exam = build_exam();
        let mut attempt = build_attempt();
        // Answer every question correctly, plus a stray answer.
        attempt.record_answer(QuestionId::new(1), 2);
        attempt.record_answer(QuestionId::new(2), 1);
        attempt.record_answer(QuestionId::new(50), 3);
        let submitted = attempt.finalize(fixed_now() + Duration::minutes(5));

        let result = score_attempt(&exam, &submitted, ResultId::new(100), "John Smith");

        assert!(result.score() <= exam.total_points());
    }

    #[test]
    fn scoring_is_idempotent() {
        let exam = build_exam();
        let mut attempt = build_attempt();
        attempt.record_answer(QuestionId::new(2), 1);
        let submitted = attempt.finalize(fixed_now() + Duration::minutes(7));

        let first = score_attempt(&exam, &submitted, ResultId::new(100), "John Smith");
        let second = score_attempt(&exam, &submitted, ResultId::new(100), "John Smith");

        assert_eq!(first, second);
    }

    #[test]
    fn submission_before_start_clamps_elapsed_time_to_zero() {
        let exam = build_exam();
        let submitted = build_attempt().finalize(fixed_now() - Duration::minutes(3));

        let result = score_attempt(&exam, &submitted, ResultId::new(100), "John Smith");

        assert_eq!(result.time_taken_minutes(), 0);
    }

    #[test]
    fn elapsed_time_rounds_to_nearest_minute() {
        let exam = build_exam();
        let submitted = build_attempt().finalize(fixed_now() + Duration::seconds(90));

        let result = score_attempt(&exam, &submitted, ResultId::new(100), "John Smith");

        assert_eq!(result.time_taken_minutes(), 2);
    }
}
