mod evaluation;
mod ids;
mod input;
mod question;
mod report;
mod session;

pub use ids::{ParseIdError, QuestionId, SessionId, UserId};
pub use input::{AnswerText, Role};

pub use evaluation::{Evaluation, EvaluationError, ScoreBand};
pub use question::{Question, QuestionError};
pub use report::{FeedbackReport, ReportState};
pub use session::{Difficulty, InterviewSession, SessionModelError, SessionStatus};
