use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EvaluationError {
    #[error("evaluation score {0} is outside 0..=10")]
    ScoreOutOfRange(f32),
}

//
// ─── SCORE BAND ───────────────────────────────────────────────────────────────
//

/// Coarse bucket of a 0-10 score used to colour feedback.
///
/// - `Strong`: 7 and above
/// - `Fair`: 4 up to 7
/// - `Weak`: below 4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Strong,
    Fair,
    Weak,
}

impl ScoreBand {
    #[must_use]
    pub fn from_score(score: f32) -> Self {
        if score >= 7.0 {
            ScoreBand::Strong
        } else if score >= 4.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Weak
        }
    }
}

//
// ─── EVALUATION ───────────────────────────────────────────────────────────────
//

/// Scored feedback for one submitted answer.
///
/// Produced once per (session, question) pair and never recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    score: f32,
    feedback: String,
    correctness: String,
    ideal_answer: String,
    improvement_tips: Vec<String>,
    missing_points: Vec<String>,
}

impl Evaluation {
    pub const MAX_SCORE: f32 = 10.0;

    /// # Errors
    ///
    /// Returns `EvaluationError::ScoreOutOfRange` when `score` is not a finite
    /// value in `0..=10`.
    pub fn new(
        score: f32,
        feedback: impl Into<String>,
        correctness: impl Into<String>,
        ideal_answer: impl Into<String>,
        improvement_tips: Vec<String>,
    ) -> Result<Self, EvaluationError> {
        if !(0.0..=Self::MAX_SCORE).contains(&score) {
            return Err(EvaluationError::ScoreOutOfRange(score));
        }
        Ok(Self {
            score,
            feedback: feedback.into(),
            correctness: correctness.into(),
            ideal_answer: ideal_answer.into(),
            improvement_tips,
            missing_points: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_missing_points(mut self, missing_points: Vec<String>) -> Self {
        self.missing_points = missing_points;
        self
    }

    #[must_use]
    pub fn score(&self) -> f32 {
        self.score
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }

    #[must_use]
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    #[must_use]
    pub fn correctness(&self) -> &str {
        &self.correctness
    }

    #[must_use]
    pub fn ideal_answer(&self) -> &str {
        &self.ideal_answer
    }

    #[must_use]
    pub fn improvement_tips(&self) -> &[String] {
        &self.improvement_tips
    }

    #[must_use]
    pub fn missing_points(&self) -> &[String] {
        &self.missing_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bounds_are_inclusive() {
        assert!(Evaluation::new(0.0, "", "", "", vec![]).is_ok());
        assert!(Evaluation::new(10.0, "", "", "", vec![]).is_ok());
    }

    #[test]
    fn out_of_range_scores_are_rejected() {
        assert_eq!(
            Evaluation::new(10.5, "", "", "", vec![]).unwrap_err(),
            EvaluationError::ScoreOutOfRange(10.5)
        );
        assert!(Evaluation::new(-1.0, "", "", "", vec![]).is_err());
        assert!(Evaluation::new(f32::NAN, "", "", "", vec![]).is_err());
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(ScoreBand::from_score(7.0), ScoreBand::Strong);
        assert_eq!(ScoreBand::from_score(6.9), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(4.0), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(3.5), ScoreBand::Weak);
    }
}
