mod attempt;
mod exam;
mod ids;
mod question;
mod result;
mod user;

pub use ids::{ExamId, ParseIdError, QuestionId, ResultId, UserId};

pub use attempt::{ExamAttempt, SubmittedAttempt};
pub use exam::{Exam, ExamError};
pub use question::{Difficulty, Question, QuestionError};
pub use result::{AnswerRecord, ExamResult, ExamResultError};
pub use user::{Role, User, UserError};
