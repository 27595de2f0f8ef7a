use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::ValidationError;
use crate::model::{FeedbackReport, ReportState, Role, SessionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionModelError {
    #[error("feedback report present while the session is in progress")]
    ReportWhileInProgress,

    #[error("completed_at present while the session is in progress")]
    CompletedAtWhileInProgress,

    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("session is already completed")]
    AlreadyCompleted,
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownDifficulty(s.to_owned()))
    }
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl SessionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "InProgress",
            SessionStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Client-side copy of an interview session.
///
/// The interview service is the system of record; this is a read-through
/// cache of what it last reported. A feedback report can only be attached to a
/// completed session, and a completed session never goes back to in-progress.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewSession {
    id: SessionId,
    role: Role,
    difficulty: Difficulty,
    status: SessionStatus,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    report: Option<FeedbackReport>,
}

impl InterviewSession {
    /// A freshly created, in-progress session.
    #[must_use]
    pub fn new(
        id: SessionId,
        role: Role,
        difficulty: Difficulty,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            role,
            difficulty,
            status: SessionStatus::InProgress,
            started_at,
            completed_at: None,
            report: None,
        }
    }

    /// Rehydrate a session from what the service reported.
    ///
    /// # Errors
    ///
    /// Returns `SessionModelError::ReportWhileInProgress` or
    /// `SessionModelError::CompletedAtWhileInProgress` when an in-progress
    /// session carries completion data, and `SessionModelError::InvalidTimeRange`
    /// when it finished before it started.
    pub fn from_persisted(
        id: SessionId,
        role: Role,
        difficulty: Difficulty,
        status: SessionStatus,
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        report: Option<FeedbackReport>,
    ) -> Result<Self, SessionModelError> {
        if status == SessionStatus::InProgress {
            if report.is_some() {
                return Err(SessionModelError::ReportWhileInProgress);
            }
            if completed_at.is_some() {
                return Err(SessionModelError::CompletedAtWhileInProgress);
            }
        }
        if completed_at.is_some_and(|at| at < started_at) {
            return Err(SessionModelError::InvalidTimeRange);
        }

        Ok(Self {
            id,
            role,
            difficulty,
            status,
            started_at,
            completed_at,
            report,
        })
    }

    /// Mark the session completed, optionally with its aggregate report.
    ///
    /// # Errors
    ///
    /// Returns `SessionModelError::AlreadyCompleted` if the session was already
    /// completed and `SessionModelError::InvalidTimeRange` if `completed_at`
    /// precedes `started_at`.
    pub fn complete(
        mut self,
        completed_at: DateTime<Utc>,
        report: Option<FeedbackReport>,
    ) -> Result<Self, SessionModelError> {
        if self.is_completed() {
            return Err(SessionModelError::AlreadyCompleted);
        }
        if completed_at < self.started_at {
            return Err(SessionModelError::InvalidTimeRange);
        }
        self.status = SessionStatus::Completed;
        self.completed_at = Some(completed_at);
        self.report = report;
        Ok(self)
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    #[must_use]
    pub fn feedback_report(&self) -> Option<&FeedbackReport> {
        self.report.as_ref()
    }

    /// Whether a report can be shown, is still pending, or cannot exist yet.
    #[must_use]
    pub fn report_state(&self) -> ReportState {
        match (&self.report, self.status) {
            (Some(report), _) => ReportState::Ready(report.clone()),
            (None, SessionStatus::Completed) => ReportState::Pending,
            (None, SessionStatus::InProgress) => ReportState::InProgress,
        }
    }
}
