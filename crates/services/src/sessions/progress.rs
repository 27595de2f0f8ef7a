use std::fmt;

use super::store::StoreSnapshot;

/// Where the interview controller is in a session's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterviewPhase {
    #[default]
    Idle,
    /// Creating or loading the session, then requesting its first question.
    Initializing,
    /// A session exists but no question has arrived yet.
    SessionOpen,
    AwaitingAnswer,
    Evaluating,
    Evaluated,
    Advancing,
    /// The service has no further questions; only `end` is left.
    ReadyToEnd,
    Ending,
    Completed,
}

impl InterviewPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InterviewPhase::Idle => "idle",
            InterviewPhase::Initializing => "initializing",
            InterviewPhase::SessionOpen => "session open",
            InterviewPhase::AwaitingAnswer => "awaiting answer",
            InterviewPhase::Evaluating => "evaluating",
            InterviewPhase::Evaluated => "evaluated",
            InterviewPhase::Advancing => "advancing",
            InterviewPhase::ReadyToEnd => "ready to end",
            InterviewPhase::Ending => "ending",
            InterviewPhase::Completed => "completed",
        }
    }

    /// A remote call is outstanding.
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            InterviewPhase::Initializing
                | InterviewPhase::Evaluating
                | InterviewPhase::Advancing
                | InterviewPhase::Ending
        )
    }
}

impl fmt::Display for InterviewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the presentation layer may offer right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Affordances {
    pub can_start: bool,
    pub can_submit: bool,
    pub can_next: bool,
    pub can_end: bool,
    pub show_evaluation: bool,
    pub busy: bool,
}

impl Affordances {
    #[must_use]
    pub fn from_state(phase: InterviewPhase, store: &StoreSnapshot) -> Self {
        let busy = phase.is_busy() || store.busy.any();
        Self {
            can_start: phase == InterviewPhase::Idle,
            can_submit: phase == InterviewPhase::AwaitingAnswer
                && store.question.is_some()
                && store.evaluation.is_none()
                && !busy,
            can_next: matches!(
                phase,
                InterviewPhase::Evaluated | InterviewPhase::SessionOpen
            ) && !busy,
            can_end: matches!(
                phase,
                InterviewPhase::Evaluated | InterviewPhase::ReadyToEnd
            ) && !busy,
            show_evaluation: store.evaluation.is_some(),
            busy,
        }
    }
}

/// Everything an observer needs to render the interview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterviewView {
    pub phase: InterviewPhase,
    pub store: StoreSnapshot,
    pub affordances: Affordances,
}

impl InterviewView {
    #[must_use]
    pub fn new(phase: InterviewPhase, store: StoreSnapshot) -> Self {
        let affordances = Affordances::from_state(phase, &store);
        Self {
            phase,
            store,
            affordances,
        }
    }
}
