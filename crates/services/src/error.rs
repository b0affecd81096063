//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::{ExamId, Role, UserId};
use storage::repository::StorageError;

/// Submission and start-up validation failures.
///
/// These are surfaced to callers as errors rather than silently dropped, so
/// a bad submission is always visible.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("exam {0} not found")]
    UnknownExam(ExamId),

    #[error("exam {0} is not open for attempts")]
    ExamInactive(ExamId),

    #[error("user {0} not found")]
    UnknownStudent(UserId),

    #[error("user {user} has role {role}; only students may take exams")]
    NotAStudent { user: UserId, role: Role },
}

/// Errors emitted by the exam session and its workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session is already finished")]
    Finished,

    #[error("no submission confirmation is pending")]
    NotConfirming,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
