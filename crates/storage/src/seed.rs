//! Sample data set the demo starts from.
//!
//! Mirrors the catalog a deployment would load from an authoring backend:
//! three users, two active exams sharing a five-question pool, and one
//! prior result so dashboards have something to show on first login.

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use exam_core::model::{
    Difficulty, Exam, ExamError, ExamId, ExamResult, ExamResultError, Question, QuestionError,
    QuestionId, ResultId, Role, User, UserError, UserId,
};

use crate::repository::{
    ExamRepository, InMemoryRepository, ResultRepository, Storage, StorageError, UserRepository,
};

/// Errors raised while building or storing the sample data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Exam(#[from] ExamError),
    #[error(transparent)]
    Result(#[from] ExamResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Well-known ids in the sample data, for demo and test wiring.
pub const SAMPLE_STUDENT: UserId = UserId::new(1);
pub const SAMPLE_TEACHER: UserId = UserId::new(2);
pub const SAMPLE_ADMIN: UserId = UserId::new(3);
pub const GENERAL_KNOWLEDGE_EXAM: ExamId = ExamId::new(1);
pub const MATHEMATICS_EXAM: ExamId = ExamId::new(2);

fn sample_users() -> Result<Vec<User>, UserError> {
    Ok(vec![
        User::new(
            SAMPLE_STUDENT,
            "john_student",
            "john@example.com",
            Role::Student,
            "John Smith",
        )?,
        User::new(
            SAMPLE_TEACHER,
            "jane_teacher",
            "jane@example.com",
            Role::Teacher,
            "Jane Doe",
        )?,
        User::new(
            SAMPLE_ADMIN,
            "admin",
            "admin@example.com",
            Role::Admin,
            "System Administrator",
        )?,
    ])
}

fn sample_questions() -> Result<Vec<Question>, QuestionError> {
    Ok(vec![
        Question::new(
            QuestionId::new(1),
            "What is the capital of France?",
            vec!["London".into(), "Berlin".into(), "Paris".into(), "Madrid".into()],
            2,
            "Geography",
            Difficulty::Easy,
            5,
        )?,
        Question::new(
            QuestionId::new(2),
            "Which programming language is known for its use in web development?",
            vec!["Python".into(), "JavaScript".into(), "C++".into(), "Java".into()],
            1,
            "Computer Science",
            Difficulty::Medium,
            10,
        )?,
        Question::new(
            QuestionId::new(3),
            "What is 15 x 8?",
            vec!["120".into(), "110".into(), "130".into(), "115".into()],
            0,
            "Mathematics",
            Difficulty::Easy,
            5,
        )?,
        Question::new(
            QuestionId::new(4),
            "Who wrote \"To Kill a Mockingbird\"?",
            vec![
                "Harper Lee".into(),
                "Mark Twain".into(),
                "Ernest Hemingway".into(),
                "F. Scott Fitzgerald".into(),
            ],
            0,
            "Literature",
            Difficulty::Medium,
            8,
        )?,
        Question::new(
            QuestionId::new(5),
            "What is the chemical symbol for gold?",
            vec!["Go".into(), "Gd".into(), "Au".into(), "Ag".into()],
            2,
            "Chemistry",
            Difficulty::Medium,
            10,
        )?,
    ])
}

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn sample_exams() -> Result<Vec<Exam>, SeedError> {
    let questions = sample_questions()?;
    let math_questions: Vec<Question> = questions
        .iter()
        .filter(|q| q.subject() == "Mathematics")
        .cloned()
        .collect();

    let general = Exam::new(
        GENERAL_KNOWLEDGE_EXAM,
        "General Knowledge Quiz",
        "A comprehensive quiz covering various subjects",
        "General",
        30,
        questions,
        SAMPLE_TEACHER,
        date(2024, 1, 15),
    )?;
    let mathematics = Exam::new(
        MATHEMATICS_EXAM,
        "Mathematics Test",
        "Basic mathematics assessment",
        "Mathematics",
        45,
        math_questions,
        SAMPLE_TEACHER,
        date(2024, 1, 10),
    )?;

    Ok(vec![general, mathematics])
}

fn sample_results() -> Result<Vec<ExamResult>, ExamResultError> {
    Ok(vec![ExamResult::from_parts(
        ResultId::new(1),
        GENERAL_KNOWLEDGE_EXAM,
        SAMPLE_STUDENT,
        "John Smith",
        23,
        38,
        25,
        date(2024, 1, 20),
        Vec::new(),
    )?])
}

/// Load the sample data into an in-memory repository.
///
/// # Errors
///
/// Returns `SeedError` if any record fails validation or storage.
pub async fn seed(repo: &InMemoryRepository) -> Result<(), SeedError> {
    for user in sample_users()? {
        repo.insert_user(user)?;
    }
    for exam in sample_exams()? {
        repo.upsert_exam(&exam).await?;
    }
    for result in sample_results()? {
        repo.append_result(&result).await?;
    }
    Ok(())
}

/// Build a seeded in-memory `Storage`, ready for the demo.
///
/// # Errors
///
/// Returns `SeedError` if seeding fails.
pub async fn in_memory_with_sample_data() -> Result<Storage, SeedError> {
    let repo = InMemoryRepository::new();
    seed(&repo).await?;
    let users: std::sync::Arc<dyn UserRepository> = std::sync::Arc::new(repo.clone());
    let exams: std::sync::Arc<dyn ExamRepository> = std::sync::Arc::new(repo.clone());
    let results: std::sync::Arc<dyn ResultRepository> = std::sync::Arc::new(repo);
    Ok(Storage {
        users,
        exams,
        results,
    })
}
