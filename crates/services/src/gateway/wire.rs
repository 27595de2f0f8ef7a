//! JSON shapes exchanged with the interview service.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use interview_core::Error as ModelError;
use interview_core::model::{
    Difficulty, Evaluation, FeedbackReport, InterviewSession, Question, QuestionId, Role,
    SessionId, SessionStatus, UserId,
};

//
// ─── REQUESTS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub(crate) struct CreateInterviewRequest<'a> {
    pub role: &'a str,
    pub difficulty: Difficulty,
    pub mode: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitAnswerRequest<'a> {
    pub question_id: &'a str,
    pub user_answer_text: &'a str,
}

//
// ─── RESPONSES ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct InterviewDto {
    #[serde(rename = "_id", alias = "id")]
    id: SessionId,
    role: String,
    difficulty: String,
    status: String,
    #[serde(deserialize_with = "utc_timestamp")]
    started_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_utc_timestamp")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    feedback_report: Option<FeedbackReportDto>,
}

#[derive(Debug, Deserialize)]
struct FeedbackReportDto {
    #[serde(default)]
    overall_score: Option<f32>,
    #[serde(default)]
    total_questions: Option<u32>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    weak_areas: Vec<String>,
    #[serde(default)]
    strengths: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionDto {
    #[serde(rename = "_id", alias = "id")]
    id: QuestionId,
    question_text: String,
    #[serde(default)]
    question_type: Option<String>,
    order_index: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerDto {
    ai_evaluation: EvaluationDto,
}

#[derive(Debug, Deserialize)]
struct EvaluationDto {
    score: f32,
    #[serde(default)]
    correctness: String,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    ideal_answer: String,
    #[serde(default)]
    improvement_tips: Vec<String>,
    #[serde(default)]
    missing_points: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompleteAck {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub fn into_detail(self) -> String {
        match self.detail {
            serde_json::Value::String(detail) => detail,
            other => other.to_string(),
        }
    }
}

//
// ─── CONVERSIONS ───────────────────────────────────────────────────────────────
//

fn parse_status(raw: &str) -> Result<SessionStatus, ModelError> {
    match raw {
        "InProgress" => Ok(SessionStatus::InProgress),
        "Completed" => Ok(SessionStatus::Completed),
        other => Err(ModelError::UnknownStatus(other.to_owned())),
    }
}

impl FeedbackReportDto {
    /// A report without an overall score has not been produced yet.
    fn into_report(self) -> Option<FeedbackReport> {
        let overall_score = self.overall_score?;
        let report =
            FeedbackReport::new(overall_score, self.strengths, self.weak_areas, self.summary);
        Some(match self.total_questions {
            Some(total) => report.with_total_questions(total),
            None => report,
        })
    }
}

impl TryFrom<InterviewDto> for InterviewSession {
    type Error = ModelError;

    fn try_from(dto: InterviewDto) -> Result<Self, Self::Error> {
        let role = Role::parse(dto.role)?;
        let difficulty: Difficulty = dto.difficulty.parse()?;
        let status = parse_status(&dto.status)?;
        let report = dto.feedback_report.and_then(FeedbackReportDto::into_report);
        Ok(InterviewSession::from_persisted(
            dto.id,
            role,
            difficulty,
            status,
            dto.started_at,
            dto.completed_at,
            report,
        )?)
    }
}

impl TryFrom<QuestionDto> for Question {
    type Error = ModelError;

    fn try_from(dto: QuestionDto) -> Result<Self, Self::Error> {
        let question = Question::new(dto.id, dto.order_index, dto.question_text)?;
        Ok(match dto.question_type {
            Some(kind) if !kind.trim().is_empty() => question.with_kind(kind),
            _ => question,
        })
    }
}

impl TryFrom<AnswerDto> for Evaluation {
    type Error = ModelError;

    fn try_from(dto: AnswerDto) -> Result<Self, Self::Error> {
        let e = dto.ai_evaluation;
        let evaluation = Evaluation::new(
            e.score,
            e.feedback,
            e.correctness,
            e.ideal_answer,
            e.improvement_tips,
        )?;
        Ok(evaluation.with_missing_points(e.missing_points))
    }
}

//
// ─── TIMESTAMPS ────────────────────────────────────────────────────────────────
//

/// Accepts RFC 3339 timestamps as well as the offset-less UTC timestamps the
/// service emits (`2024-03-01T10:15:30.123456`).
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(at) => Ok(at.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc()),
    }
}

fn utc_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn optional_utc_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|raw| parse_timestamp(&raw).map_err(serde::de::Error::custom))
        .transpose()
}
