//! Presentation-agnostic aggregations backing the dashboard and result
//! history views.
//!
//! These carry no pre-formatted strings or layout assumptions; views format
//! timestamps and percentages as they see fit.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use exam_core::model::{Exam, ExamId, ExamResult, ResultId, UserId};
use storage::repository::{ExamRepository, ResultRepository, Storage};

use crate::error::DashboardError;

/// Percentage at or above which a result counts as a pass.
pub const PASS_MARK_PERCENT: f64 = 60.0;

/// How many recent results the student dashboard shows.
const STUDENT_RECENT_RESULTS: usize = 3;
/// How many recent results the teacher dashboard shows.
const TEACHER_RECENT_RESULTS: usize = 5;

/// One row in a result list, with the exam title joined in when the exam
/// still exists in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultListItem {
    pub id: ResultId,
    pub exam_id: ExamId,
    pub exam_title: Option<String>,
    pub score: u32,
    pub total_points: u32,
    pub percentage: f64,
    pub time_taken_minutes: u32,
    pub completed_at: DateTime<Utc>,
}

impl ResultListItem {
    #[must_use]
    pub fn from_result(result: &ExamResult, exam_title: Option<String>) -> Self {
        Self {
            id: result.id(),
            exam_id: result.exam_id(),
            exam_title,
            score: result.score(),
            total_points: result.total_points(),
            percentage: result.percentage(),
            time_taken_minutes: result.time_taken_minutes(),
            completed_at: result.completed_at(),
        }
    }
}

/// Headline numbers for a student's dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentOverview {
    pub available_exams: usize,
    pub completed_exams: usize,
    pub average_percentage: f64,
    pub recent_results: Vec<ResultListItem>,
}

/// Headline numbers for a teacher's dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct TeacherOverview {
    pub total_exams: usize,
    pub active_exams: usize,
    pub total_attempts: usize,
    pub class_average_percentage: f64,
    pub questions_created: usize,
    pub recent_results: Vec<ResultListItem>,
}

/// A student's full result history with summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultHistory {
    pub exams_taken: usize,
    pub average_percentage: f64,
    pub passed: usize,
    pub total_time_minutes: u64,
    /// Newest first.
    pub results: Vec<ResultListItem>,
}

fn average_percentage<'a>(results: impl IntoIterator<Item = &'a ExamResult>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0_u32;
    for result in results {
        sum += result.percentage();
        count += 1;
    }
    if count == 0 { 0.0 } else { sum / f64::from(count) }
}

fn join_titles(results: &[ExamResult], exams: &[Exam], limit: usize) -> Vec<ResultListItem> {
    results
        .iter()
        .take(limit)
        .map(|result| {
            let title = exams
                .iter()
                .find(|exam| exam.id() == result.exam_id())
                .map(|exam| exam.title().to_owned());
            ResultListItem::from_result(result, title)
        })
        .collect()
}

/// Read-side facade over the exam catalog and the result collection.
#[derive(Clone)]
pub struct DashboardService {
    exams: Arc<dyn ExamRepository>,
    results: Arc<dyn ResultRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(exams: Arc<dyn ExamRepository>, results: Arc<dyn ResultRepository>) -> Self {
        Self { exams, results }
    }

    /// Wire the service to an existing storage aggregate.
    #[must_use]
    pub fn with_storage(storage: &Storage) -> Self {
        Self::new(Arc::clone(&storage.exams), Arc::clone(&storage.results))
    }

    /// Student dashboard: active exams, own completions, own average.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` on repository failures.
    pub async fn student_overview(
        &self,
        student: UserId,
    ) -> Result<StudentOverview, DashboardError> {
        let exams = self.exams.list_exams().await?;
        let available_exams = exams.iter().filter(|exam| exam.is_active()).count();

        let mut completed = self.results.results_for_student(student).await?;
        let average = average_percentage(&completed);
        completed.sort_by_key(|result| std::cmp::Reverse(result.completed_at()));

        Ok(StudentOverview {
            available_exams,
            completed_exams: completed.len(),
            average_percentage: average,
            recent_results: join_titles(&completed, &exams, STUDENT_RECENT_RESULTS),
        })
    }

    /// Teacher dashboard: own exams, attempts across them, class average.
    ///
    /// The class average spans all results, matching what the original
    /// teacher view displays.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` on repository failures.
    pub async fn teacher_overview(
        &self,
        teacher: UserId,
    ) -> Result<TeacherOverview, DashboardError> {
        let exams = self.exams.list_exams().await?;
        let my_exams: Vec<&Exam> = exams
            .iter()
            .filter(|exam| exam.created_by() == teacher)
            .collect();
        let active_exams = my_exams.iter().filter(|exam| exam.is_active()).count();
        let questions_created = my_exams.iter().map(|exam| exam.question_count()).sum();

        let mut results = self.results.list_results().await?;
        let total_attempts = results
            .iter()
            .filter(|result| my_exams.iter().any(|exam| exam.id() == result.exam_id()))
            .count();
        let class_average = average_percentage(&results);
        results.sort_by_key(|result| std::cmp::Reverse(result.completed_at()));

        Ok(TeacherOverview {
            total_exams: my_exams.len(),
            active_exams,
            total_attempts,
            class_average_percentage: class_average,
            questions_created,
            recent_results: join_titles(&results, &exams, TEACHER_RECENT_RESULTS),
        })
    }

    /// A student's full history, newest first, with pass/time totals.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` on repository failures.
    pub async fn result_history(&self, student: UserId) -> Result<ResultHistory, DashboardError> {
        let exams = self.exams.list_exams().await?;
        let mut results = self.results.results_for_student(student).await?;

        let average = average_percentage(&results);
        let passed = results
            .iter()
            .filter(|result| result.percentage() >= PASS_MARK_PERCENT)
            .count();
        let total_time_minutes = results
            .iter()
            .map(|result| u64::from(result.time_taken_minutes()))
            .sum();

        results.sort_by_key(|result| std::cmp::Reverse(result.completed_at()));

        Ok(ResultHistory {
            exams_taken: results.len(),
            average_percentage: average,
            passed,
            total_time_minutes,
            results: join_titles(&results, &exams, usize::MAX),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::time::fixed_now;
    use storage::seed::{self, GENERAL_KNOWLEDGE_EXAM, SAMPLE_STUDENT, SAMPLE_TEACHER};

    fn build_result(id: u64, exam: ExamId, student: UserId, score: u32) -> ExamResult {
        ExamResult::from_parts(
            ResultId::new(id),
            exam,
            student,
            "John Smith",
            score,
            38,
            20,
            fixed_now() + chrono::Duration::minutes(id as i64),
            Vec::new(),
        )
        .unwrap()
    }

    async fn seeded_service() -> (DashboardService, Storage) {
        let storage = seed::in_memory_with_sample_data().await.unwrap();
        (DashboardService::with_storage(&storage), storage)
    }

    #[tokio::test]
    async fn student_overview_counts_only_own_results() {
        let (service, storage) = seeded_service().await;
        storage
            .results
            .append_result(&build_result(100, GENERAL_KNOWLEDGE_EXAM, UserId::new(42), 38))
            .await
            .unwrap();

        let overview = service.student_overview(SAMPLE_STUDENT).await.unwrap();
        assert_eq!(overview.available_exams, 2);
        assert_eq!(overview.completed_exams, 1);
        // the seeded result: 23/38
        assert!((overview.average_percentage - 100.0 * 23.0 / 38.0).abs() < 0.1);
        assert_eq!(overview.recent_results.len(), 1);
        assert_eq!(
            overview.recent_results[0].exam_title.as_deref(),
            Some("General Knowledge Quiz")
        );
    }

    #[tokio::test]
    async fn student_with_no_results_has_zero_average() {
        let (service, _storage) = seeded_service().await;
        let overview = service.student_overview(UserId::new(42)).await.unwrap();
        assert_eq!(overview.completed_exams, 0);
        assert_eq!(overview.average_percentage, 0.0);
        assert!(overview.recent_results.is_empty());
    }

    #[tokio::test]
    async fn teacher_overview_aggregates_own_exams() {
        let (service, _storage) = seeded_service().await;
        let overview = service.teacher_overview(SAMPLE_TEACHER).await.unwrap();

        assert_eq!(overview.total_exams, 2);
        assert_eq!(overview.active_exams, 2);
        assert_eq!(overview.total_attempts, 1);
        assert_eq!(overview.questions_created, 6); // 5 + 1
        assert_eq!(overview.recent_results.len(), 1);
    }

    #[tokio::test]
    async fn result_history_sorts_newest_first_and_counts_passes() {
        let (service, storage) = seeded_service().await;
        storage
            .results
            .append_result(&build_result(101, GENERAL_KNOWLEDGE_EXAM, SAMPLE_STUDENT, 38))
            .await
            .unwrap();
        storage
            .results
            .append_result(&build_result(102, GENERAL_KNOWLEDGE_EXAM, SAMPLE_STUDENT, 10))
            .await
            .unwrap();

        let history = service.result_history(SAMPLE_STUDENT).await.unwrap();
        assert_eq!(history.exams_taken, 3);
        // seeded 60.5% and the 100% pass; 10/38 fails the 60% mark
        assert_eq!(history.passed, 2);
        assert_eq!(history.total_time_minutes, 25 + 20 + 20);
        assert_eq!(history.results[0].id, ResultId::new(102));
        assert!(history.results.windows(2).all(|w| w[0].completed_at >= w[1].completed_at));
    }

    #[tokio::test]
    async fn recent_results_are_capped() {
        let (service, storage) = seeded_service().await;
        for id in 0..6 {
            storage
                .results
                .append_result(&build_result(200 + id, GENERAL_KNOWLEDGE_EXAM, SAMPLE_STUDENT, 19))
                .await
                .unwrap();
        }

        let student = service.student_overview(SAMPLE_STUDENT).await.unwrap();
        assert_eq!(student.recent_results.len(), 3);

        let teacher = service.teacher_overview(SAMPLE_TEACHER).await.unwrap();
        assert_eq!(teacher.recent_results.len(), 5);
    }
}
