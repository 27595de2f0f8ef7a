use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use interview_core::model::{
    Difficulty, InterviewSession, ReportState, SessionId, SessionStatus,
};

use crate::error::ReaderError;
use crate::gateway::InterviewGateway;

/// One row of the session history.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionListItem {
    pub id: SessionId,
    pub role: String,
    pub difficulty: Difficulty,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub overall_score: Option<f32>,
}

impl SessionListItem {
    #[must_use]
    pub fn from_session(session: &InterviewSession) -> Self {
        Self {
            id: session.id().clone(),
            role: session.role().as_str().to_owned(),
            difficulty: session.difficulty(),
            status: session.status(),
            started_at: session.started_at(),
            overall_score: session.feedback_report().map(|r| r.overall_score()),
        }
    }
}

/// A session together with whether its report can be shown yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub session: InterviewSession,
    pub report: ReportState,
}

/// Read-only access to past sessions. Shares the gateway with the controller.
#[derive(Clone)]
pub struct SessionReader {
    gateway: Arc<dyn InterviewGateway>,
}

impl SessionReader {
    #[must_use]
    pub fn new(gateway: Arc<dyn InterviewGateway>) -> Self {
        Self { gateway }
    }

    /// The caller's sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::Service` if the list cannot be fetched.
    pub async fn list_sessions(&self) -> Result<Vec<SessionListItem>, ReaderError> {
        let mut sessions = self.gateway.list_sessions().await?;
        sessions.sort_by(|a, b| {
            b.started_at()
                .cmp(&a.started_at())
                .then_with(|| b.id().cmp(a.id()))
        });
        debug!(count = sessions.len(), "listed interview sessions");
        Ok(sessions.iter().map(SessionListItem::from_session).collect())
    }

    /// A session with its report, or a distinguishable "no report yet".
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::NotFound` for an unknown or inaccessible session
    /// and `ReaderError::Service` on remote failure.
    pub async fn open_report(&self, session_id: &SessionId) -> Result<SessionReport, ReaderError> {
        let session = self.gateway.fetch_session(session_id).await?;
        let report = session.report_state();
        debug!(%session_id, ready = report.is_ready(), "opened session report");
        Ok(SessionReport { session, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use interview_core::model::{FeedbackReport, Role};
    use interview_core::time::fixed_now;

    use crate::gateway::{GatewayOp, InMemoryGateway};

    fn session(id: &str, minutes: i64) -> InterviewSession {
        InterviewSession::new(
            SessionId::new(id),
            Role::parse("Backend Developer").unwrap(),
            Difficulty::Medium,
            fixed_now() + Duration::minutes(minutes),
        )
    }

    fn reader(gateway: &InMemoryGateway) -> SessionReader {
        SessionReader::new(Arc::new(gateway.clone()))
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let gateway = InMemoryGateway::new();
        gateway.insert_session(session("old", 0));
        gateway.insert_session(session("new", 30));
        gateway.insert_session(session("mid", 10));

        let items = reader(&gateway).list_sessions().await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn completed_session_without_report_is_pending() {
        let gateway = InMemoryGateway::new();
        let completed = session("s-1", 0)
            .complete(fixed_now() + Duration::minutes(5), None)
            .unwrap();
        gateway.insert_session(completed);

        let opened = reader(&gateway)
            .open_report(&SessionId::new("s-1"))
            .await
            .unwrap();
        assert_eq!(opened.report, ReportState::Pending);
    }

    #[tokio::test]
    async fn in_progress_session_has_no_report_yet() {
        let gateway = InMemoryGateway::new();
        gateway.insert_session(session("s-1", 0));

        let opened = reader(&gateway)
            .open_report(&SessionId::new("s-1"))
            .await
            .unwrap();
        assert_eq!(opened.report, ReportState::InProgress);
    }

    #[tokio::test]
    async fn ready_report_carries_score_into_list() {
        let gateway = InMemoryGateway::new();
        let report = FeedbackReport::new(6.5, Vec::new(), vec!["Caching".into()], "ok");
        let completed = session("s-1", 0)
            .complete(fixed_now() + Duration::minutes(5), Some(report.clone()))
            .unwrap();
        gateway.insert_session(completed);

        let reader = reader(&gateway);
        let opened = reader.open_report(&SessionId::new("s-1")).await.unwrap();
        assert_eq!(opened.report, ReportState::Ready(report));
        let items = reader.list_sessions().await.unwrap();
        assert_eq!(items[0].overall_score, Some(6.5));
        assert_eq!(items[0].status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let gateway = InMemoryGateway::new();
        let err = reader(&gateway)
            .open_report(&SessionId::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReaderError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_failure_is_a_service_error() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next(GatewayOp::ListSessions);
        let err = reader(&gateway).list_sessions().await.unwrap_err();
        assert!(matches!(err, ReaderError::Service(_)));
    }
}
