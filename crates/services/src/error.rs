//! Shared error types for the services crate.

use thiserror::Error;

use interview_core::ValidationError;
use interview_core::model::{QuestionId, SessionId};

use crate::sessions::InterviewPhase;

/// A remote call that did not produce a usable reply.
///
/// Always transient from the client's point of view: the caller keeps its
/// state and the user may trigger the same action again.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("interview service returned status {status}{}", detail_suffix(.detail))]
    HttpStatus {
        status: reqwest::StatusCode,
        detail: Option<String>,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("malformed interview service response: {0}")]
    InvalidResponse(#[from] interview_core::Error),
    #[error("interview service rejected the request: {0}")]
    Rejected(String),
    #[error("interview service unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected reply from interview service: {0}")]
    UnexpectedReply(&'static str),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

impl ServiceError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ServiceError::Http(err) if err.is_timeout())
    }
}

/// Errors emitted by `InterviewGateway` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The service has no further questions for the session. Expected; not a fault.
    #[error("no further questions for this session")]
    Exhausted,
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl GatewayError {
    pub(crate) fn session_not_found(id: &SessionId) -> Self {
        GatewayError::NotFound(format!("interview session {id}"))
    }
}

/// An operation that the current state does not allow.
///
/// Reaching one of these means the caller skipped a guard; the controller's
/// affordances never offer the action in the first place.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LogicError {
    #[error("no interview session is open")]
    NoSession,
    #[error("interview session is already completed")]
    SessionCompleted,
    #[error("completed session {0} was reported as in progress again")]
    StatusRegression(SessionId),
    #[error("there is no current question")]
    NoCurrentQuestion,
    #[error("an answer submission is already in flight")]
    SubmissionInFlight,
    #[error("question {0} already has an evaluation")]
    DuplicateEvaluation(QuestionId),
    #[error("evaluation for question {got} does not match current question {current}")]
    QuestionMismatch { current: QuestionId, got: QuestionId },
    #[error("question order index {got} does not follow {previous}")]
    OutOfOrderQuestion { previous: u32, got: u32 },
    #[error("{action} is not allowed while {phase}")]
    IllegalTransition {
        action: &'static str,
        phase: InterviewPhase,
    },
}

/// Errors emitted by `InterviewController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Logic(#[from] LogicError),
    /// The interview was closed while the request was in flight; its reply was dropped.
    #[error("reply discarded: the interview was closed while the request was in flight")]
    Discarded,
}

impl ControllerError {
    /// Whether re-triggering the same action may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ControllerError::Service(_))
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ControllerError::Service(err) if err.is_timeout())
    }
}

impl From<GatewayError> for ControllerError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(what) => ControllerError::NotFound(what),
            GatewayError::Service(err) => ControllerError::Service(err),
            // Only `fetch_next_question` may report exhaustion; the controller
            // handles it there.
            GatewayError::Exhausted => {
                ControllerError::Service(ServiceError::UnexpectedReply("exhausted"))
            }
        }
    }
}

/// Errors emitted by `SessionReader`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReaderError {
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<GatewayError> for ReaderError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(what) => ReaderError::NotFound(what),
            GatewayError::Service(err) => ReaderError::Service(err),
            GatewayError::Exhausted => {
                ReaderError::Service(ServiceError::UnexpectedReply("exhausted"))
            }
        }
    }
}

/// Errors emitted while loading `ServiceConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
