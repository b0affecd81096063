mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use service::{
    ExamSession, NavDirection, SessionPhase, TickOutcome, LOW_TIME_SECONDS,
};
pub use workflow::ExamLoopService;
