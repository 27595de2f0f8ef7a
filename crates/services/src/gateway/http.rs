use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use interview_core::IdentityContext;
use interview_core::model::{
    AnswerText, Difficulty, Evaluation, InterviewSession, Question, QuestionId, Role, SessionId,
};

use super::InterviewGateway;
use super::wire::{
    AnswerDto, CompleteAck, CreateInterviewRequest, ErrorBody, InterviewDto, QuestionDto,
    SubmitAnswerRequest,
};
use crate::config::ServiceConfig;
use crate::error::{GatewayError, ServiceError};

/// `InterviewGateway` over the interview service's JSON API.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl HttpGateway {
    /// Build a gateway whose requests carry the identity's bearer token, if any.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be constructed.
    pub fn new(config: &ServiceConfig, identity: &IdentityContext) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(client, config, identity))
    }

    #[must_use]
    pub fn with_client(client: Client, config: &ServiceConfig, identity: &IdentityContext) -> Self {
        Self {
            client,
            api_base: config.api_base(),
            token: identity.bearer_token().map(str::to_owned),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(ServiceError::from)?;
        Ok(response)
    }
}

/// Best-effort extraction of the service's `{"detail": ...}` error body.
async fn error_detail(response: Response) -> Option<String> {
    response
        .json::<ErrorBody>()
        .await
        .ok()
        .map(ErrorBody::into_detail)
}

async fn decode<T: DeserializeOwned>(
    response: Response,
    what: impl FnOnce() -> String,
) -> Result<T, GatewayError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound(what()));
    }
    if !status.is_success() {
        let detail = error_detail(response).await;
        warn!(%status, detail = detail.as_deref().unwrap_or(""), "interview service request failed");
        return Err(ServiceError::HttpStatus { status, detail }.into());
    }
    let body = response.json::<T>().await.map_err(ServiceError::from)?;
    Ok(body)
}

/// `next_question` takes no client input, so an explicit refusal there means
/// the session cannot yield more questions. The service answers its own
/// question cap with a 500, which stays a `ServiceError`; the controller stops
/// at the cap before asking.
fn signals_exhaustion(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::NO_CONTENT | StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::GONE
    )
}

#[async_trait]
impl InterviewGateway for HttpGateway {
    async fn create_session(
        &self,
        role: &Role,
        difficulty: Difficulty,
    ) -> Result<InterviewSession, GatewayError> {
        debug!(role = role.as_str(), %difficulty, "creating interview session");
        let payload = CreateInterviewRequest {
            role: role.as_str(),
            difficulty,
            mode: "Text",
        };
        let response = self
            .send(self.client.post(self.url("/interviews/")).json(&payload))
            .await?;
        let dto: InterviewDto = decode(response, || "interview endpoint".into()).await?;
        Ok(InterviewSession::try_from(dto).map_err(ServiceError::from)?)
    }

    async fn fetch_next_question(&self, session_id: &SessionId) -> Result<Question, GatewayError> {
        debug!(%session_id, "requesting next question");
        let response = self
            .send(
                self.client
                    .post(self.url(&format!("/interviews/{session_id}/next_question"))),
            )
            .await?;

        let status = response.status();
        if signals_exhaustion(status) {
            let detail = error_detail(response).await;
            debug!(%session_id, %status, detail = detail.as_deref().unwrap_or(""), "no further questions");
            return Err(GatewayError::Exhausted);
        }

        let dto: QuestionDto =
            decode(response, || format!("interview session {session_id}")).await?;
        Ok(Question::try_from(dto).map_err(ServiceError::from)?)
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
        answer: &AnswerText,
    ) -> Result<Evaluation, GatewayError> {
        debug!(%session_id, %question_id, "submitting answer");
        let payload = SubmitAnswerRequest {
            question_id: question_id.as_str(),
            user_answer_text: answer.as_str(),
        };
        let response = self
            .send(
                self.client
                    .post(self.url(&format!("/interviews/{session_id}/submit_answer")))
                    .json(&payload),
            )
            .await?;
        let dto: AnswerDto = decode(response, || {
            format!("question {question_id} of interview session {session_id}")
        })
        .await?;
        Ok(Evaluation::try_from(dto).map_err(ServiceError::from)?)
    }

    async fn complete_session(&self, session_id: &SessionId) -> Result<(), GatewayError> {
        debug!(%session_id, "completing interview session");
        let response = self
            .send(
                self.client
                    .post(self.url(&format!("/interviews/{session_id}/complete"))),
            )
            .await?;
        let ack: CompleteAck =
            decode(response, || format!("interview session {session_id}")).await?;
        debug!(%session_id, message = ack.message.as_deref().unwrap_or(""), "completion acknowledged");
        Ok(())
    }

    async fn fetch_session(
        &self,
        session_id: &SessionId,
    ) -> Result<InterviewSession, GatewayError> {
        debug!(%session_id, "fetching interview session");
        let response = self
            .send(self.client.get(self.url(&format!("/interviews/{session_id}"))))
            .await?;
        let dto: InterviewDto =
            decode(response, || format!("interview session {session_id}")).await?;
        Ok(InterviewSession::try_from(dto).map_err(ServiceError::from)?)
    }

    async fn list_sessions(&self) -> Result<Vec<InterviewSession>, GatewayError> {
        debug!("listing interview sessions");
        let response = self
            .send(self.client.get(self.url("/interviews/")))
            .await?;
        let dtos: Vec<InterviewDto> = decode(response, || "interview list".into()).await?;
        let sessions = dtos
            .into_iter()
            .map(InterviewSession::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::from)?;
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    use interview_core::model::{ReportState, SessionStatus, UserId};

    fn config_for(server: &ServerGuard) -> ServiceConfig {
        ServiceConfig {
            base_url: server.url(),
            ..ServiceConfig::default()
        }
    }

    fn gateway(server: &ServerGuard) -> HttpGateway {
        HttpGateway::new(&config_for(server), &IdentityContext::guest()).unwrap()
    }

    fn interview_json(status: &str, report: serde_json::Value) -> String {
        json!({
            "_id": "s-1",
            "user_id": "guest_id_00000000000000",
            "role": "Backend Developer",
            "difficulty": "Medium",
            "status": status,
            "started_at": "2024-03-01T10:00:00.000000",
            "completed_at": if status == "Completed" { json!("2024-03-01T10:30:00") } else { json!(null) },
            "feedback_report": report,
        })
        .to_string()
    }

    #[tokio::test]
    async fn create_session_posts_role_and_difficulty() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/interviews/")
            .match_body(Matcher::Json(json!({
                "role": "Backend Developer",
                "difficulty": "Medium",
                "mode": "Text"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(interview_json("InProgress", json!(null)))
            .create_async()
            .await;

        let session = gateway(&server)
            .create_session(&Role::parse("Backend Developer").unwrap(), Difficulty::Medium)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert!(session.feedback_report().is_none());
    }

    #[tokio::test]
    async fn bearer_token_is_sent_for_authenticated_callers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/interviews/")
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let identity = IdentityContext::authenticated(
            UserId::new("u-1"),
            "a@example.com",
            None,
            "tok-123",
        );
        let gateway = HttpGateway::new(&config_for(&server), &identity).unwrap();
        let sessions = gateway.list_sessions().await.unwrap();

        mock.assert_async().await;
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn next_question_maps_question_fields() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/interviews/s-1/next_question")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "_id": "q-1",
                    "interview_id": "s-1",
                    "question_text": "How would you deduplicate events?",
                    "question_type": "Technical",
                    "order_index": 1
                })
                .to_string(),
            )
            .create_async()
            .await;

        let question = gateway(&server)
            .fetch_next_question(&SessionId::new("s-1"))
            .await
            .unwrap();
        assert_eq!(question.id().as_str(), "q-1");
        assert_eq!(question.order_index(), 1);
        assert_eq!(question.text(), "How would you deduplicate events?");
    }

    #[tokio::test]
    async fn refusal_on_next_question_is_exhaustion() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/interviews/s-1/next_question")
            .with_status(409)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"Interview is already completed"}"#)
            .create_async()
            .await;

        let err = gateway(&server)
            .fetch_next_question(&SessionId::new("s-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Exhausted));
    }

    #[tokio::test]
    async fn server_errors_are_service_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/interviews/s-1/next_question")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let err = gateway(&server)
            .fetch_next_question(&SessionId::new("s-1"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Service(ServiceError::HttpStatus { status, .. })
                if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/interviews/missing")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"Interview not found"}"#)
            .create_async()
            .await;

        let err = gateway(&server)
            .fetch_session(&SessionId::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn submit_answer_returns_evaluation() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/interviews/s-1/submit_answer")
            .match_body(Matcher::Json(json!({
                "question_id": "q-1",
                "user_answer_text": "I would use a hash map."
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "_id": "a-1",
                    "interview_id": "s-1",
                    "question_id": "q-1",
                    "user_answer_text": "I would use a hash map.",
                    "ai_evaluation": {
                        "score": 8,
                        "correctness": "Correct",
                        "feedback": "Solid",
                        "ideal_answer": "...",
                        "improvement_tips": [],
                        "missing_points": []
                    },
                    "created_at": "2024-03-01T10:05:00"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let evaluation = gateway(&server)
            .submit_answer(
                &SessionId::new("s-1"),
                &QuestionId::new("q-1"),
                &AnswerText::parse("I would use a hash map.").unwrap(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(evaluation.score(), 8.0);
        assert_eq!(evaluation.feedback(), "Solid");
        assert!(evaluation.improvement_tips().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_score_is_a_malformed_response() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/interviews/s-1/submit_answer")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "ai_evaluation": {
                        "score": 42,
                        "correctness": "?",
                        "feedback": "?",
                        "ideal_answer": "?",
                        "improvement_tips": []
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let err = gateway(&server)
            .submit_answer(
                &SessionId::new("s-1"),
                &QuestionId::new("q-1"),
                &AnswerText::parse("anything").unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Service(ServiceError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn complete_then_fetch_reads_report() {
        let mut server = Server::new_async().await;
        let complete = server
            .mock("POST", "/api/v1/interviews/s-1/complete")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Interview completed","report":null}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/v1/interviews/s-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(interview_json(
                "Completed",
                json!({
                    "overall_score": 7.5,
                    "total_questions": 2,
                    "summary": "Candidate scored 7.5/10 on average.",
                    "weak_areas": ["Caching"],
                    "strengths": ["Good understanding of tested concepts"]
                }),
            ))
            .create_async()
            .await;

        let gateway = gateway(&server);
        let id = SessionId::new("s-1");
        gateway.complete_session(&id).await.unwrap();
        let session = gateway.fetch_session(&id).await.unwrap();

        complete.assert_async().await;
        let ReportState::Ready(report) = session.report_state() else {
            panic!("expected a ready report");
        };
        assert_eq!(report.overall_score(), 7.5);
        assert_eq!(report.total_questions(), Some(2));
        assert_eq!(report.weak_areas(), ["Caching".to_string()]);
    }
}
