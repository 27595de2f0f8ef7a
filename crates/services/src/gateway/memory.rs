use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use interview_core::Clock;
use interview_core::model::{
    AnswerText, Difficulty, Evaluation, FeedbackReport, InterviewSession, Question, QuestionId,
    Role, SessionId,
};

use super::InterviewGateway;
use crate::error::{GatewayError, ServiceError};

/// Remote calls an `InMemoryGateway` records and can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    CreateSession,
    FetchNextQuestion,
    SubmitAnswer,
    CompleteSession,
    FetchSession,
    ListSessions,
}

const DEFAULT_QUESTIONS: [&str; 3] = [
    "Walk me through a project you are proud of and the trade-offs you made.",
    "How would you find and fix a performance regression in production?",
    "Describe how you would design an idempotent API endpoint.",
];

/// Service-side scoring threshold below which a question counts as a weak area.
const WEAK_SCORE: f32 = 6.0;

#[derive(Debug)]
struct StoredSession {
    session: InterviewSession,
    served: Vec<QuestionId>,
    scores: HashMap<QuestionId, f32>,
}

#[derive(Debug)]
struct State {
    clock: Clock,
    next_id: u64,
    bank: Vec<String>,
    evaluation: Option<Evaluation>,
    produce_reports: bool,
    sessions: Vec<StoredSession>,
    failures: HashMap<GatewayOp, u32>,
    calls: HashMap<GatewayOp, usize>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            clock: Clock::default(),
            next_id: 1,
            bank: DEFAULT_QUESTIONS.iter().map(|q| (*q).to_owned()).collect(),
            evaluation: None,
            produce_reports: true,
            sessions: Vec::new(),
            failures: HashMap::new(),
            calls: HashMap::new(),
        }
    }
}

fn default_evaluation() -> Result<Evaluation, ServiceError> {
    Evaluation::new(
        7.0,
        "Clear structure with a concrete example.",
        "Correct",
        "State the problem, the constraint, the decision and its outcome.",
        vec!["Quantify the impact.".to_owned()],
    )
    .map_err(|e| ServiceError::InvalidResponse(e.into()))
}

impl State {
    fn mint(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Count the call and consume an injected failure for it, if any.
    fn enter(&mut self, op: GatewayOp) -> Result<(), ServiceError> {
        *self.calls.entry(op).or_default() += 1;
        match self.failures.get_mut(&op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(ServiceError::Unavailable(format!("injected failure for {op:?}")))
            }
            _ => Ok(()),
        }
    }

    fn stored_mut(&mut self, id: &SessionId) -> Result<&mut StoredSession, GatewayError> {
        self.sessions
            .iter_mut()
            .find(|stored| stored.session.id() == id)
            .ok_or_else(|| GatewayError::session_not_found(id))
    }

    fn report_for(&self, stored: &StoredSession) -> Option<FeedbackReport> {
        if !self.produce_reports || stored.scores.is_empty() {
            return None;
        }
        let total = stored.scores.len();
        let overall = stored.scores.values().sum::<f32>() / total as f32;
        let weak_areas = stored
            .served
            .iter()
            .enumerate()
            .filter(|(_, id)| stored.scores.get(*id).is_some_and(|s| *s < WEAK_SCORE))
            .filter_map(|(index, _)| self.bank.get(index).cloned())
            .collect();
        let strengths = if overall >= 7.0 {
            vec!["Good understanding of tested concepts".to_owned()]
        } else {
            Vec::new()
        };
        let summary = format!("Candidate scored {overall:.1}/10 on average.");
        Some(
            FeedbackReport::new(overall, strengths, weak_areas, summary)
                .with_total_questions(u32::try_from(total).unwrap_or(u32::MAX)),
        )
    }
}

/// In-process stand-in for the interview service.
///
/// Serves questions from a fixed bank, scores every answer with the same
/// evaluation and averages the scores into a report on completion. Clones
/// share state, so a test can keep a handle for inspection after passing one
/// to the controller.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<State>>,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the question bank. Sessions are exhausted once it runs out.
    #[must_use]
    pub fn with_questions<I, S>(self, questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.guard().bank = questions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_evaluation(self, evaluation: Evaluation) -> Self {
        self.guard().evaluation = Some(evaluation);
        self
    }

    #[must_use]
    pub fn with_clock(self, clock: Clock) -> Self {
        self.guard().clock = clock;
        self
    }

    /// Complete sessions without ever producing a feedback report.
    #[must_use]
    pub fn without_reports(self) -> Self {
        self.guard().produce_reports = false;
        self
    }

    /// Make the next call of `op` fail with `ServiceError::Unavailable`.
    pub fn fail_next(&self, op: GatewayOp) {
        *self.guard().failures.entry(op).or_default() += 1;
    }

    /// How many times `op` has been called, failed calls included.
    #[must_use]
    pub fn calls(&self, op: GatewayOp) -> usize {
        self.guard().calls.get(&op).copied().unwrap_or_default()
    }

    /// Seed a session as if it had been created earlier.
    pub fn insert_session(&self, session: InterviewSession) {
        let mut state = self.guard();
        state.sessions.retain(|stored| stored.session.id() != session.id());
        state.sessions.push(StoredSession {
            session,
            served: Vec::new(),
            scores: HashMap::new(),
        });
    }

    // Test-facing helpers tolerate poisoning; trait methods report it.
    fn guard(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, ServiceError> {
        self.state
            .lock()
            .map_err(|e| ServiceError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl InterviewGateway for InMemoryGateway {
    async fn create_session(
        &self,
        role: &Role,
        difficulty: Difficulty,
    ) -> Result<InterviewSession, GatewayError> {
        let mut state = self.lock()?;
        state.enter(GatewayOp::CreateSession)?;
        let id = SessionId::new(state.mint("session"));
        let session = InterviewSession::new(id, role.clone(), difficulty, state.clock.now());
        state.sessions.push(StoredSession {
            session: session.clone(),
            served: Vec::new(),
            scores: HashMap::new(),
        });
        Ok(session)
    }

    async fn fetch_next_question(&self, session_id: &SessionId) -> Result<Question, GatewayError> {
        let mut state = self.lock()?;
        state.enter(GatewayOp::FetchNextQuestion)?;
        let position = state.stored_mut(session_id)?.served.len();
        let completed = state.stored_mut(session_id)?.session.is_completed();
        let Some(text) = state.bank.get(position).cloned() else {
            return Err(GatewayError::Exhausted);
        };
        if completed {
            return Err(GatewayError::Exhausted);
        }

        let id = QuestionId::new(state.mint("question"));
        let order_index = u32::try_from(position + 1)
            .map_err(|_| ServiceError::Rejected("question bank too large".into()))?;
        let question = Question::new(id.clone(), order_index, text).map_err(|e| {
            ServiceError::InvalidResponse(interview_core::Error::from(e))
        })?;
        state.stored_mut(session_id)?.served.push(id);
        Ok(question)
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
        _answer: &AnswerText,
    ) -> Result<Evaluation, GatewayError> {
        let mut state = self.lock()?;
        state.enter(GatewayOp::SubmitAnswer)?;
        let evaluation = match &state.evaluation {
            Some(evaluation) => evaluation.clone(),
            None => default_evaluation()?,
        };
        let stored = state.stored_mut(session_id)?;
        if stored.session.is_completed() {
            return Err(ServiceError::Rejected("interview is already completed".into()).into());
        }
        if !stored.served.contains(question_id) {
            return Err(GatewayError::NotFound(format!("question {question_id}")));
        }
        if stored.scores.contains_key(question_id) {
            return Err(
                ServiceError::Rejected(format!("question {question_id} was already answered"))
                    .into(),
            );
        }
        stored.scores.insert(question_id.clone(), evaluation.score());
        Ok(evaluation)
    }

    async fn complete_session(&self, session_id: &SessionId) -> Result<(), GatewayError> {
        let mut state = self.lock()?;
        state.enter(GatewayOp::CompleteSession)?;
        let now = state.clock.now();
        let index = state
            .sessions
            .iter()
            .position(|stored| stored.session.id() == session_id)
            .ok_or_else(|| GatewayError::session_not_found(session_id))?;
        if state.sessions[index].session.is_completed() {
            return Ok(());
        }

        let report = state.report_for(&state.sessions[index]);
        let stored = &mut state.sessions[index];
        let completed = stored
            .session
            .clone()
            .complete(now, report)
            .map_err(|e| ServiceError::InvalidResponse(e.into()))?;
        stored.session = completed;
        Ok(())
    }

    async fn fetch_session(
        &self,
        session_id: &SessionId,
    ) -> Result<InterviewSession, GatewayError> {
        let mut state = self.lock()?;
        state.enter(GatewayOp::FetchSession)?;
        Ok(state.stored_mut(session_id)?.session.clone())
    }

    async fn list_sessions(&self) -> Result<Vec<InterviewSession>, GatewayError> {
        let mut state = self.lock()?;
        state.enter(GatewayOp::ListSessions)?;
        Ok(state
            .sessions
            .iter()
            .map(|stored| stored.session.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::model::ReportState;
    use interview_core::time::fixed_clock;

    fn role() -> Role {
        Role::parse("Data Engineer").unwrap()
    }

    fn answer() -> AnswerText {
        AnswerText::parse("Partition by date and compact nightly.").unwrap()
    }

    #[tokio::test]
    async fn serves_questions_in_order_until_bank_runs_out() {
        let gateway = InMemoryGateway::new().with_questions(["first", "second"]);
        let session = gateway.create_session(&role(), Difficulty::Easy).await.unwrap();

        let q1 = gateway.fetch_next_question(session.id()).await.unwrap();
        let q2 = gateway.fetch_next_question(session.id()).await.unwrap();
        assert_eq!((q1.order_index(), q1.text()), (1, "first"));
        assert_eq!((q2.order_index(), q2.text()), (2, "second"));
        assert!(matches!(
            gateway.fetch_next_question(session.id()).await,
            Err(GatewayError::Exhausted)
        ));
    }

    #[tokio::test]
    async fn second_answer_for_a_question_is_rejected() {
        let gateway = InMemoryGateway::new();
        let session = gateway.create_session(&role(), Difficulty::Hard).await.unwrap();
        let q = gateway.fetch_next_question(session.id()).await.unwrap();

        gateway
            .submit_answer(session.id(), q.id(), &answer())
            .await
            .unwrap();
        let err = gateway
            .submit_answer(session.id(), q.id(), &answer())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Service(ServiceError::Rejected(_))));
    }

    #[tokio::test]
    async fn completion_averages_scores_into_report() {
        let gateway = InMemoryGateway::new().with_clock(fixed_clock());
        let session = gateway.create_session(&role(), Difficulty::Medium).await.unwrap();
        let q = gateway.fetch_next_question(session.id()).await.unwrap();
        gateway
            .submit_answer(session.id(), q.id(), &answer())
            .await
            .unwrap();

        gateway.complete_session(session.id()).await.unwrap();
        let completed = gateway.fetch_session(session.id()).await.unwrap();

        let ReportState::Ready(report) = completed.report_state() else {
            panic!("expected a report");
        };
        assert_eq!(report.overall_score(), 7.0);
        assert_eq!(report.total_questions(), Some(1));
        assert!(matches!(
            gateway.fetch_next_question(session.id()).await,
            Err(GatewayError::Exhausted)
        ));
    }

    #[tokio::test]
    async fn completion_without_answers_has_no_report() {
        let gateway = InMemoryGateway::new();
        let session = gateway.create_session(&role(), Difficulty::Medium).await.unwrap();
        gateway.complete_session(session.id()).await.unwrap();

        let completed = gateway.fetch_session(session.id()).await.unwrap();
        assert_eq!(completed.report_state(), ReportState::Pending);
    }

    #[tokio::test]
    async fn injected_failure_applies_once_and_is_counted() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next(GatewayOp::ListSessions);

        assert!(gateway.list_sessions().await.is_err());
        assert!(gateway.list_sessions().await.is_ok());
        assert_eq!(gateway.calls(GatewayOp::ListSessions), 2);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let gateway = InMemoryGateway::new();
        let err = gateway
            .fetch_session(&SessionId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }
}
