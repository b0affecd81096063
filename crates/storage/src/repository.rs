use async_trait::async_trait;
use exam_core::model::{Exam, ExamId, ExamResult, User, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),
}

/// Repository contract for user identity records.
///
/// The login selector is out of scope; it consumes this seam.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by ID, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// All known users.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    async fn list_users(&self) -> Result<Vec<User>, StorageError>;
}

/// Repository contract for the exam catalog.
#[async_trait]
pub trait ExamRepository: Send + Sync {
    /// Persist or update an exam.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the exam cannot be stored.
    async fn upsert_exam(&self, exam: &Exam) -> Result<(), StorageError>;

    /// Fetch an exam by ID, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    async fn get_exam(&self, id: ExamId) -> Result<Option<Exam>, StorageError>;

    /// All exams, active or not.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    async fn list_exams(&self) -> Result<Vec<Exam>, StorageError>;
}

/// Repository contract for the append-only result collection.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Append a result; results are never updated once written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` when a result with the same id
    /// already exists.
    async fn append_result(&self, result: &ExamResult) -> Result<(), StorageError>;

    /// All results in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    async fn list_results(&self) -> Result<Vec<ExamResult>, StorageError>;

    /// Results for one student, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    async fn results_for_student(&self, student: UserId) -> Result<Vec<ExamResult>, StorageError>;

    /// Results for one exam, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails.
    async fn results_for_exam(&self, exam: ExamId) -> Result<Vec<ExamResult>, StorageError>;
}

/// In-memory repository backing the demo and the test suite.
///
/// Results live in a `Vec` so insertion order survives; the id index only
/// guards against duplicate appends.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<HashMap<UserId, User>>>,
    exams: Arc<Mutex<HashMap<ExamId, Exam>>>,
    results: Arc<Mutex<Vec<ExamResult>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user record directly; used by seeding.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` when the store is poisoned.
    pub fn insert_user(&self, user: User) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user.id(), user);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut users: Vec<User> = guard.values().cloned().collect();
        users.sort_by_key(User::id);
        Ok(users)
    }
}

#[async_trait]
impl ExamRepository for InMemoryRepository {
    async fn upsert_exam(&self, exam: &Exam) -> Result<(), StorageError> {
        let mut guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(exam.id(), exam.clone());
        Ok(())
    }

    async fn get_exam(&self, id: ExamId) -> Result<Option<Exam>, StorageError> {
        let guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_exams(&self) -> Result<Vec<Exam>, StorageError> {
        let guard = self
            .exams
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut exams: Vec<Exam> = guard.values().cloned().collect();
        exams.sort_by_key(Exam::id);
        Ok(exams)
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &ExamResult) -> Result<(), StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.iter().any(|existing| existing.id() == result.id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(result.clone());
        Ok(())
    }

    async fn list_results(&self) -> Result<Vec<ExamResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn results_for_student(&self, student: UserId) -> Result<Vec<ExamResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|r| r.student_id() == student)
            .cloned()
            .collect())
    }

    async fn results_for_exam(&self, exam: ExamId) -> Result<Vec<ExamResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|r| r.exam_id() == exam)
            .cloned()
            .collect())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub exams: Arc<dyn ExamRepository>,
    pub results: Arc<dyn ResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let exams: Arc<dyn ExamRepository> = Arc::new(repo.clone());
        let results: Arc<dyn ResultRepository> = Arc::new(repo);
        Self {
            users,
            exams,
            results,
        }
    }
}
