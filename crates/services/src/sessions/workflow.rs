use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use interview_core::IdentityContext;
use interview_core::model::{
    AnswerText, Difficulty, Evaluation, InterviewSession, Question, ReportState, Role, SessionId,
};

use super::progress::{InterviewPhase, InterviewView};
use super::store::{SessionStore, StoreSnapshot};
use crate::config::DEFAULT_MAX_QUESTIONS;
use crate::error::{ControllerError, GatewayError, LogicError};
use crate::gateway::InterviewGateway;

/// How a start, resume or advance request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    /// A new question is ready for an answer.
    Question(Question),
    /// The service has no further questions; the session can only be ended.
    ReadyToEnd,
    /// A resumed session had already been completed.
    AlreadyCompleted(ReportState),
}

#[derive(Debug, Clone, Default)]
struct ControllerState {
    phase: InterviewPhase,
    store: SessionStore,
    generation: u64,
}

/// Identifies the request a reply belongs to.
#[derive(Debug, Clone)]
struct Ticket {
    generation: u64,
    session: Option<SessionId>,
}

impl Ticket {
    fn for_session(&self, session: SessionId) -> Self {
        Self {
            generation: self.generation,
            session: Some(session),
        }
    }

    fn matches(&self, state: &ControllerState) -> bool {
        self.generation == state.generation
            && self
                .session
                .as_ref()
                .is_none_or(|id| state.store.session_id() == Some(id))
    }
}

/// Drives one interview from creation to its final report.
///
/// Every action checks its guard and advances the phase under a short lock
/// that is released before the gateway call, so a second trigger of the same
/// step is rejected instead of issuing another request. Replies are applied
/// only if the controller has not been torn down or switched sessions since
/// the request was issued.
///
/// The service fails instead of refusing once a session holds its last
/// question, so `next` stops at the question limit without asking it.
pub struct InterviewController {
    gateway: Arc<dyn InterviewGateway>,
    identity: IdentityContext,
    question_limit: u32,
    state: Mutex<ControllerState>,
    views: watch::Sender<InterviewView>,
}

impl InterviewController {
    #[must_use]
    pub fn new(gateway: Arc<dyn InterviewGateway>, identity: IdentityContext) -> Self {
        let (views, _) = watch::channel(InterviewView::new(
            InterviewPhase::Idle,
            StoreSnapshot::default(),
        ));
        Self {
            gateway,
            identity,
            question_limit: DEFAULT_MAX_QUESTIONS,
            state: Mutex::new(ControllerState::default()),
            views,
        }
    }

    /// Treat the session as exhausted once a question with this order index
    /// has been served.
    #[must_use]
    pub fn with_question_limit(mut self, limit: u32) -> Self {
        self.question_limit = limit;
        self
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    /// Observe every published view, starting with the current one.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<InterviewView> {
        self.views.subscribe()
    }

    #[must_use]
    pub fn view(&self) -> InterviewView {
        self.views.borrow().clone()
    }

    #[must_use]
    pub fn phase(&self) -> InterviewPhase {
        self.lock().phase
    }

    /// Create a session and request its first question.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Validation` for a blank role before any
    /// remote call, `ControllerError::Logic` outside `Idle`, and
    /// `ControllerError::Service` if the session or its first question could
    /// not be obtained. A failed first question leaves the session open so
    /// `next` can retry it.
    pub async fn start(
        &self,
        role: &str,
        difficulty: Difficulty,
    ) -> Result<RoundOutcome, ControllerError> {
        let role = Role::parse(role)?;
        let ticket = self.begin_load("start")?;

        let created = self.gateway.create_session(&role, difficulty).await;
        let session_ticket = match created {
            Ok(session) => {
                let id = session.id().clone();
                info!(session_id = %id, role = %role, %difficulty, "interview session created");
                self.apply(&ticket, |state| open_for_first_question(state, session))
                    .map(|()| ticket.for_session(id))
            }
            Err(err) => Err(err.into()),
        }
        .map_err(|err| self.revert(&ticket, InterviewPhase::Idle, err))?;

        self.fetch_question(session_ticket, InterviewPhase::SessionOpen)
            .await
    }

    /// Load an existing session and continue it with a new question.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` for an unknown session,
    /// `ControllerError::Logic` outside `Idle` and `ControllerError::Service`
    /// on remote failure.
    pub async fn resume(&self, session_id: &SessionId) -> Result<RoundOutcome, ControllerError> {
        let ticket = self.begin_load("resume")?;

        let loaded = self.gateway.fetch_session(session_id).await;
        let (session_ticket, completed) = match loaded {
            Ok(session) if session.is_completed() => {
                let report = session.report_state();
                self.apply(&ticket, |state| {
                    state.store.set_session(session)?;
                    state.store.mark_completed();
                    state.phase = InterviewPhase::Completed;
                    Ok(())
                })
                .map(|()| (ticket.clone(), Some(report)))
            }
            Ok(session) => {
                let id = session.id().clone();
                self.apply(&ticket, |state| open_for_first_question(state, session))
                    .map(|()| (ticket.for_session(id), None))
            }
            Err(err) => Err(err.into()),
        }
        .map_err(|err| self.revert(&ticket, InterviewPhase::Idle, err))?;

        if let Some(report) = completed {
            info!(%session_id, "resumed session is already completed");
            return Ok(RoundOutcome::AlreadyCompleted(report));
        }
        info!(%session_id, "resuming interview session");
        self.fetch_question(session_ticket, InterviewPhase::SessionOpen)
            .await
    }

    /// Submit the answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Validation` for a blank answer,
    /// `ControllerError::Logic` unless a question is awaiting its answer (in
    /// particular while a submission is in flight or after it was evaluated),
    /// and `ControllerError::Service` on remote failure, after which the
    /// answer may be submitted again.
    pub async fn submit(&self, answer: &str) -> Result<Evaluation, ControllerError> {
        let answer = AnswerText::parse(answer)?;
        let (ticket, session_id, question_id) = {
            let mut state = self.lock();
            if !matches!(
                state.phase,
                InterviewPhase::AwaitingAnswer | InterviewPhase::Evaluating | InterviewPhase::Evaluated
            ) {
                return Err(illegal("submit", state.phase));
            }
            let (session_id, question_id) = state.store.begin_submit()?;
            state.phase = InterviewPhase::Evaluating;
            let ticket = Ticket {
                generation: state.generation,
                session: Some(session_id.clone()),
            };
            self.publish(&state);
            (ticket, session_id, question_id)
        };

        let reply = self
            .gateway
            .submit_answer(&session_id, &question_id, &answer)
            .await;
        let applied = match reply {
            Ok(evaluation) => self.apply(&ticket, |state| {
                state.store.set_evaluation(&question_id, evaluation.clone())?;
                state.phase = InterviewPhase::Evaluated;
                Ok(evaluation)
            }),
            Err(err) => Err(err.into()),
        };
        applied.map_err(|err| self.revert(&ticket, InterviewPhase::AwaitingAnswer, err))
    }

    /// Request the next question once the current one is evaluated.
    ///
    /// At the question limit this moves to `ReadyToEnd` without a request.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Logic` before an evaluation exists or once the
    /// session is completed, and `ControllerError::Service` on remote failure.
    pub async fn next(&self) -> Result<RoundOutcome, ControllerError> {
        let (ticket, restore) = {
            let mut state = self.lock();
            let restore = state.phase;
            match restore {
                InterviewPhase::Evaluated | InterviewPhase::SessionOpen => {}
                InterviewPhase::Completed => return Err(LogicError::SessionCompleted.into()),
                phase => return Err(illegal("next", phase)),
            }
            let served = state.store.question().map_or(0, Question::order_index);
            if restore == InterviewPhase::Evaluated && served >= self.question_limit {
                state.store.ensure_open()?;
                info!(served, limit = self.question_limit, "question limit reached");
                state.phase = InterviewPhase::ReadyToEnd;
                self.publish(&state);
                return Ok(RoundOutcome::ReadyToEnd);
            }
            let session_id = state.store.begin_fetch()?;
            state.phase = InterviewPhase::Advancing;
            let ticket = Ticket {
                generation: state.generation,
                session: Some(session_id),
            };
            self.publish(&state);
            (ticket, restore)
        };
        self.fetch_question(ticket, restore).await
    }

    /// Complete the session and read back its feedback report.
    ///
    /// Once the service acknowledged completion the phase stays `Completed`
    /// even if reading the report fails; `refresh_report` retries the read.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Logic` unless the current question was
    /// evaluated or the questions are exhausted, and `ControllerError::Service`
    /// on remote failure.
    pub async fn end(&self) -> Result<ReportState, ControllerError> {
        let (ticket, restore, session_id) = {
            let mut state = self.lock();
            let restore = state.phase;
            match restore {
                InterviewPhase::Evaluated | InterviewPhase::ReadyToEnd => {}
                InterviewPhase::Completed => return Err(LogicError::SessionCompleted.into()),
                phase => return Err(illegal("end", phase)),
            }
            let session_id = state.store.ensure_open()?.clone();
            state.phase = InterviewPhase::Ending;
            let ticket = Ticket {
                generation: state.generation,
                session: Some(session_id.clone()),
            };
            self.publish(&state);
            (ticket, restore, session_id)
        };

        let acknowledged = self.gateway.complete_session(&session_id).await;
        let applied = match acknowledged {
            Ok(()) => self.apply(&ticket, |state| {
                state.store.mark_completed();
                state.phase = InterviewPhase::Completed;
                Ok(())
            }),
            Err(err) => Err(err.into()),
        };
        applied.map_err(|err| self.revert(&ticket, restore, err))?;

        info!(%session_id, "interview session completed");
        self.read_report(&ticket, &session_id).await
    }

    /// Read the report of the completed session again.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Logic` unless the session is completed and
    /// `ControllerError::Service` on remote failure.
    pub async fn refresh_report(&self) -> Result<ReportState, ControllerError> {
        let (ticket, session_id) = {
            let state = self.lock();
            if state.phase != InterviewPhase::Completed {
                return Err(illegal("refresh report", state.phase));
            }
            let session_id = state
                .store
                .session_id()
                .cloned()
                .ok_or(LogicError::NoSession)?;
            let ticket = Ticket {
                generation: state.generation,
                session: Some(session_id.clone()),
            };
            (ticket, session_id)
        };
        self.read_report(&ticket, &session_id).await
    }

    /// Close the interview. Replies still in flight are discarded.
    pub fn teardown(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.store.clear();
        state.phase = InterviewPhase::Idle;
        self.publish(&state);
    }

    // ─── internals ───────────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ControllerState) {
        let previous = self.views.borrow().phase;
        if previous != state.phase {
            info!(from = %previous, to = %state.phase, "interview phase changed");
        }
        self.views
            .send_replace(InterviewView::new(state.phase, state.store.snapshot()));
    }

    fn begin_load(&self, action: &'static str) -> Result<Ticket, ControllerError> {
        let mut state = self.lock();
        if state.phase != InterviewPhase::Idle {
            return Err(illegal(action, state.phase));
        }
        state.store.begin_load();
        state.phase = InterviewPhase::Initializing;
        let ticket = Ticket {
            generation: state.generation,
            session: None,
        };
        self.publish(&state);
        Ok(ticket)
    }

    /// Apply a reply to a copy of the state and commit it only on success.
    fn apply<T>(
        &self,
        ticket: &Ticket,
        update: impl FnOnce(&mut ControllerState) -> Result<T, ControllerError>,
    ) -> Result<T, ControllerError> {
        let mut state = self.lock();
        if !ticket.matches(&state) {
            return Err(ControllerError::Discarded);
        }
        let mut next = state.clone();
        let value = update(&mut next)?;
        *state = next;
        self.publish(&state);
        Ok(value)
    }

    /// Restore the pre-call phase after a failed request and hand back the error.
    fn revert(&self, ticket: &Ticket, restore: InterviewPhase, err: ControllerError) -> ControllerError {
        if matches!(err, ControllerError::Discarded) {
            return err;
        }
        let mut state = self.lock();
        if !ticket.matches(&state) {
            return ControllerError::Discarded;
        }
        warn!(error = %err, phase = %state.phase, restored = %restore, "interview request failed");
        state.store.abort_busy();
        if restore == InterviewPhase::Idle {
            state.store.clear();
        }
        state.phase = restore;
        self.publish(&state);
        err
    }

    async fn fetch_question(
        &self,
        ticket: Ticket,
        restore: InterviewPhase,
    ) -> Result<RoundOutcome, ControllerError> {
        let Some(session_id) = ticket.session.clone() else {
            return Err(LogicError::NoSession.into());
        };
        let reply = self.gateway.fetch_next_question(&session_id).await;
        let applied = match reply {
            Ok(question) => self.apply(&ticket, |state| {
                state.store.reset();
                state.store.set_question(question.clone())?;
                state.phase = InterviewPhase::AwaitingAnswer;
                Ok(RoundOutcome::Question(question))
            }),
            Err(GatewayError::Exhausted) => self.apply(&ticket, |state| {
                state.store.abort_busy();
                state.phase = InterviewPhase::ReadyToEnd;
                Ok(RoundOutcome::ReadyToEnd)
            }),
            Err(err) => Err(err.into()),
        };
        applied.map_err(|err| self.revert(&ticket, restore, err))
    }

    async fn read_report(
        &self,
        ticket: &Ticket,
        session_id: &SessionId,
    ) -> Result<ReportState, ControllerError> {
        let session = self.gateway.fetch_session(session_id).await.map_err(|err| {
            warn!(%session_id, error = %err, "could not read feedback report");
            ControllerError::from(err)
        })?;
        if !session.is_completed() {
            debug!(%session_id, "completion not visible yet, report pending");
            return Ok(ReportState::Pending);
        }
        let report = session.report_state();
        self.apply(ticket, |state| {
            state.store.set_session(session)?;
            Ok(())
        })?;
        Ok(report)
    }
}

fn illegal(action: &'static str, phase: InterviewPhase) -> ControllerError {
    LogicError::IllegalTransition { action, phase }.into()
}

fn open_for_first_question(
    state: &mut ControllerState,
    session: InterviewSession,
) -> Result<(), ControllerError> {
    state.store.set_session(session)?;
    state.store.begin_fetch()?;
    Ok(())
}
