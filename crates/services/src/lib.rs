#![forbid(unsafe_code)]

//! Application services for the examination demo: the exam session state
//! machine, the take-an-exam workflow, and dashboard aggregations.

pub mod dashboard;
pub mod error;
pub mod session;

pub use dashboard::{
    DashboardService, ResultHistory, ResultListItem, StudentOverview, TeacherOverview,
    PASS_MARK_PERCENT,
};
pub use error::{DashboardError, SessionError, ValidationError};
pub use exam_core::Clock;
pub use session::{
    ExamLoopService, ExamSession, NavDirection, SessionPhase, SessionProgress, TickOutcome,
    LOW_TIME_SECONDS,
};
