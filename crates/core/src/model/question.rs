use thiserror::Error;

use crate::model::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question order index is 1-based, got 0")]
    ZeroOrderIndex,

    #[error("question text must not be empty")]
    EmptyText,
}

/// A question issued by the interview service. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    order_index: u32,
    text: String,
    kind: String,
}

impl Question {
    pub const DEFAULT_KIND: &'static str = "Technical";

    /// # Errors
    ///
    /// Returns `QuestionError::ZeroOrderIndex` for an order index of 0 and
    /// `QuestionError::EmptyText` for a blank prompt.
    pub fn new(
        id: QuestionId,
        order_index: u32,
        text: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        if order_index == 0 {
            return Err(QuestionError::ZeroOrderIndex);
        }
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        Ok(Self {
            id,
            order_index,
            text,
            kind: Self::DEFAULT_KIND.to_owned(),
        })
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn order_index(&self) -> u32 {
        self.order_index
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }
}
