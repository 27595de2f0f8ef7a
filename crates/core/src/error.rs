use thiserror::Error;

use crate::model::{EvaluationError, QuestionError, SessionModelError};

/// Input rejected before anything is sent to the interview service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("role must not be empty")]
    EmptyRole,

    #[error("unknown difficulty: {0:?} (expected Easy, Medium or Hard)")]
    UnknownDifficulty(String),

    #[error("answer must not be empty")]
    EmptyAnswer,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Session(#[from] SessionModelError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("unknown session status: {0:?}")]
    UnknownStatus(String),
}
