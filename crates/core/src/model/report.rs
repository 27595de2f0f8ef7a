/// Aggregate feedback the service derives once a session is completed.
///
/// The client never computes this; it only carries what the service sent.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackReport {
    overall_score: f32,
    total_questions: Option<u32>,
    strengths: Vec<String>,
    weak_areas: Vec<String>,
    summary: String,
}

impl FeedbackReport {
    #[must_use]
    pub fn new(
        overall_score: f32,
        strengths: Vec<String>,
        weak_areas: Vec<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            overall_score,
            total_questions: None,
            strengths,
            weak_areas,
            summary: summary.into(),
        }
    }

    #[must_use]
    pub fn with_total_questions(mut self, total: u32) -> Self {
        self.total_questions = Some(total);
        self
    }

    #[must_use]
    pub fn overall_score(&self) -> f32 {
        self.overall_score
    }

    #[must_use]
    pub fn total_questions(&self) -> Option<u32> {
        self.total_questions
    }

    #[must_use]
    pub fn strengths(&self) -> &[String] {
        &self.strengths
    }

    #[must_use]
    pub fn weak_areas(&self) -> &[String] {
        &self.weak_areas
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

/// What a reader can show for a session's report.
///
/// `Pending` and `InProgress` are deliberately distinct from an empty report.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportState {
    Ready(FeedbackReport),
    /// Session completed, report not produced (yet).
    Pending,
    /// Session still running; no report can exist.
    InProgress,
}

impl ReportState {
    #[must_use]
    pub fn report(&self) -> Option<&FeedbackReport> {
        match self {
            ReportState::Ready(report) => Some(report),
            ReportState::Pending | ReportState::InProgress => None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, ReportState::Ready(_))
    }
}
