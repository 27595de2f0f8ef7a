use interview_core::model::{Evaluation, InterviewSession, Question, QuestionId, SessionId};

use crate::error::LogicError;

/// Outstanding-request flags. Independent of each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyFlags {
    pub initializing: bool,
    pub fetching_question: bool,
    pub submitting_answer: bool,
}

impl BusyFlags {
    #[must_use]
    pub fn any(&self) -> bool {
        self.initializing || self.fetching_question || self.submitting_answer
    }
}

/// Read-only copy of the store handed to observers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub session: Option<InterviewSession>,
    pub question: Option<Question>,
    pub evaluation: Option<Evaluation>,
    pub busy: BusyFlags,
    pub completed: bool,
    pub rounds_evaluated: u32,
}

/// Client-side state of the interview open in the UI.
///
/// Every operation is pure and all-or-nothing: a rejected transition returns a
/// `LogicError` and leaves the store exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    session: Option<InterviewSession>,
    question: Option<Question>,
    evaluation: Option<Evaluation>,
    busy: BusyFlags,
    completed: bool,
    last_order_index: u32,
    rounds_evaluated: u32,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn session(&self) -> Option<&InterviewSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref().map(InterviewSession::id)
    }

    #[must_use]
    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    #[must_use]
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    #[must_use]
    pub fn busy(&self) -> BusyFlags {
        self.busy
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn rounds_evaluated(&self) -> u32 {
        self.rounds_evaluated
    }

    /// A session is being created or loaded.
    pub fn begin_load(&mut self) {
        self.busy.initializing = true;
        self.question = None;
        self.evaluation = None;
    }

    /// Store what the service reported for the session.
    ///
    /// Switching to a different session starts its question sequence afresh.
    ///
    /// # Errors
    ///
    /// Returns `LogicError::StatusRegression` if the store already holds this
    /// session as completed and the incoming copy says it is in progress.
    pub fn set_session(&mut self, session: InterviewSession) -> Result<(), LogicError> {
        let same = self.session_id() == Some(session.id());
        if same && self.completed && !session.is_completed() {
            return Err(LogicError::StatusRegression(session.id().clone()));
        }
        if !same {
            self.question = None;
            self.evaluation = None;
            self.last_order_index = 0;
            self.rounds_evaluated = 0;
        }
        self.completed = session.is_completed();
        self.busy.initializing = false;
        self.session = Some(session);
        Ok(())
    }

    /// The open session, if a new question may be requested for it.
    ///
    /// # Errors
    ///
    /// Returns `LogicError::NoSession` without a session and
    /// `LogicError::SessionCompleted` once it is completed.
    pub fn ensure_open(&self) -> Result<&SessionId, LogicError> {
        let session = self.session.as_ref().ok_or(LogicError::NoSession)?;
        if self.completed || session.is_completed() {
            return Err(LogicError::SessionCompleted);
        }
        Ok(session.id())
    }

    /// # Errors
    ///
    /// Returns the `ensure_open` errors and `LogicError::SubmissionInFlight`
    /// while an answer is being evaluated.
    pub fn begin_fetch(&mut self) -> Result<SessionId, LogicError> {
        let id = self.ensure_open()?.clone();
        if self.busy.submitting_answer {
            return Err(LogicError::SubmissionInFlight);
        }
        self.busy.fetching_question = true;
        Ok(id)
    }

    /// Replace the current question and drop the previous evaluation.
    ///
    /// # Errors
    ///
    /// Returns `LogicError::SubmissionInFlight` while an answer is pending,
    /// and `LogicError::OutOfOrderQuestion` unless the order index is greater
    /// than every index seen so far.
    pub fn set_question(&mut self, question: Question) -> Result<(), LogicError> {
        self.ensure_open()?;
        if self.busy.submitting_answer {
            return Err(LogicError::SubmissionInFlight);
        }
        if question.order_index() <= self.last_order_index {
            return Err(LogicError::OutOfOrderQuestion {
                previous: self.last_order_index,
                got: question.order_index(),
            });
        }
        self.last_order_index = question.order_index();
        self.question = Some(question);
        self.evaluation = None;
        self.busy.fetching_question = false;
        self.busy.initializing = false;
        Ok(())
    }

    /// Mark an answer for the current question as in flight.
    ///
    /// # Errors
    ///
    /// Returns `LogicError::NoCurrentQuestion` without a question,
    /// `LogicError::SubmissionInFlight` if one is already pending and
    /// `LogicError::DuplicateEvaluation` once the question is evaluated.
    pub fn begin_submit(&mut self) -> Result<(SessionId, QuestionId), LogicError> {
        let session_id = self.ensure_open()?.clone();
        let question = self.question.as_ref().ok_or(LogicError::NoCurrentQuestion)?;
        if self.busy.submitting_answer {
            return Err(LogicError::SubmissionInFlight);
        }
        if self.evaluation.is_some() {
            return Err(LogicError::DuplicateEvaluation(question.id().clone()));
        }
        let question_id = question.id().clone();
        self.busy.submitting_answer = true;
        Ok((session_id, question_id))
    }

    /// Attach the evaluation of the current question.
    ///
    /// # Errors
    ///
    /// Returns `LogicError::NoCurrentQuestion` without a question,
    /// `LogicError::QuestionMismatch` if `question_id` is not the current one
    /// and `LogicError::DuplicateEvaluation` if it is already evaluated.
    pub fn set_evaluation(
        &mut self,
        question_id: &QuestionId,
        evaluation: Evaluation,
    ) -> Result<(), LogicError> {
        let current = self.question.as_ref().ok_or(LogicError::NoCurrentQuestion)?;
        if current.id() != question_id {
            return Err(LogicError::QuestionMismatch {
                current: current.id().clone(),
                got: question_id.clone(),
            });
        }
        if self.evaluation.is_some() {
            return Err(LogicError::DuplicateEvaluation(question_id.clone()));
        }
        self.evaluation = Some(evaluation);
        self.busy.submitting_answer = false;
        self.rounds_evaluated += 1;
        Ok(())
    }

    /// Clear busy flags after a failed or abandoned request.
    pub fn abort_busy(&mut self) {
        self.busy = BusyFlags::default();
    }

    /// Drop the current round before the next question is shown.
    pub fn reset(&mut self) {
        self.question = None;
        self.evaluation = None;
        self.busy = BusyFlags::default();
    }

    /// The service acknowledged completion. Terminal for this session.
    pub fn mark_completed(&mut self) {
        self.completed = true;
        self.question = None;
        self.evaluation = None;
        self.busy = BusyFlags::default();
    }

    /// Forget everything, including the session.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            session: self.session.clone(),
            question: self.question.clone(),
            evaluation: self.evaluation.clone(),
            busy: self.busy,
            completed: self.completed,
            rounds_evaluated: self.rounds_evaluated,
        }
    }
}
