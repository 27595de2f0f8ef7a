//! Boundary between the interview state machine and the remote interview service.

mod http;
mod memory;
pub(crate) mod wire;

use async_trait::async_trait;

use interview_core::model::{
    AnswerText, Difficulty, Evaluation, InterviewSession, Question, QuestionId, Role, SessionId,
};

use crate::error::GatewayError;

pub use http::HttpGateway;
pub use memory::{GatewayOp, InMemoryGateway};

/// Intents the controller and reader can send to the interview service.
///
/// Implementations hold no per-session state and never retry: every call is
/// issued at most once, and failures come back as typed `GatewayError`s.
/// Inputs are pre-validated types, so a blank role or answer cannot reach the
/// network.
#[async_trait]
pub trait InterviewGateway: Send + Sync {
    /// Create a new in-progress session with no question yet.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Service` on transport or service failure.
    async fn create_session(
        &self,
        role: &Role,
        difficulty: Difficulty,
    ) -> Result<InterviewSession, GatewayError>;

    /// Ask the service for the next question of a session.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Exhausted` when the session has no further
    /// questions, `GatewayError::NotFound` for an unknown session, and
    /// `GatewayError::Service` otherwise.
    async fn fetch_next_question(&self, session_id: &SessionId) -> Result<Question, GatewayError>;

    /// Submit the answer for a question and receive its evaluation.
    ///
    /// Recorded server-side; must not be called twice for one question.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` for an unknown session or question and
    /// `GatewayError::Service` otherwise.
    async fn submit_answer(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
        answer: &AnswerText,
    ) -> Result<Evaluation, GatewayError>;

    /// Request aggregate scoring. The report is read back with `fetch_session`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` for an unknown session and
    /// `GatewayError::Service` otherwise.
    async fn complete_session(&self, session_id: &SessionId) -> Result<(), GatewayError>;

    /// Read a session, including its feedback report once available.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` if the session is unknown or not
    /// visible to the caller.
    async fn fetch_session(&self, session_id: &SessionId)
    -> Result<InterviewSession, GatewayError>;

    /// List the caller's sessions.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Service` on transport or service failure.
    async fn list_sessions(&self) -> Result<Vec<InterviewSession>, GatewayError>;
}
