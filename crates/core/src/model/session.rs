use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("score ({score}) exceeds answered count ({answered})")]
    ScoreExceedsAnswered { score: usize, answered: usize },

    #[error("answered count ({answered}) exceeds session length ({total})")]
    AnsweredExceedsTotal { answered: usize, total: usize },
}

/// Which kind of run a session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Untimed; outcomes persist to the progress ledger.
    Practice,
    /// Timed, fixed-size simulation; nothing persists.
    Test,
}

/// Construction parameters for a quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: SessionMode,
    /// Shuffle the source list before applying `limit`.
    pub shuffle: bool,
    /// Truncate the (possibly shuffled) sequence to the first N questions.
    pub limit: Option<usize>,
    /// Countdown length; `None` means untimed.
    pub time_limit_secs: Option<u32>,
    /// Question `order` to resume from. Only honored when not shuffling.
    pub resume_from: Option<u32>,
}

impl SessionConfig {
    /// Untimed practice over the full question set.
    #[must_use]
    pub fn practice() -> Self {
        Self {
            mode: SessionMode::Practice,
            shuffle: false,
            limit: None,
            time_limit_secs: None,
            resume_from: None,
        }
    }

    /// Timed test: `limit` shuffled questions in `minutes` minutes.
    #[must_use]
    pub fn test(limit: usize, minutes: u32) -> Self {
        Self {
            mode: SessionMode::Test,
            shuffle: true,
            limit: Some(limit),
            time_limit_secs: Some(minutes * 60),
            resume_from: None,
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn with_resume_from(mut self, order: u32) -> Self {
        self.resume_from = Some(order);
        self
    }
}

/// Final scoring for a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    mode: SessionMode,
    total_questions: usize,
    answered: usize,
    score: usize,
}

impl SessionSummary {
    /// Build a summary from recorded counts.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError` if the counts are inconsistent (score above
    /// answered, or answered above the sequence length).
    pub fn new(
        mode: SessionMode,
        total_questions: usize,
        answered: usize,
        score: usize,
    ) -> Result<Self, SummaryError> {
        if score > answered {
            return Err(SummaryError::ScoreExceedsAnswered { score, answered });
        }
        if answered > total_questions {
            return Err(SummaryError::AnsweredExceedsTotal {
                answered,
                total: total_questions,
            });
        }

        Ok(Self {
            mode,
            total_questions,
            answered,
            score,
        })
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.answered
    }

    /// Count of answers recorded as correct.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// Score over sequence length, rounded to the nearest whole percent.
    /// An empty session scores 0.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            ((self.score as f64 / self.total_questions as f64) * 100.0).round() as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_nearest() {
        let summary = SessionSummary::new(SessionMode::Test, 5, 5, 3).unwrap();
        assert_eq!(summary.percentage(), 60);

        let summary = SessionSummary::new(SessionMode::Test, 3, 3, 1).unwrap();
        assert_eq!(summary.percentage(), 33);

        let summary = SessionSummary::new(SessionMode::Test, 3, 3, 2).unwrap();
        assert_eq!(summary.percentage(), 67);
    }

    #[test]
    fn empty_session_scores_zero() {
        let summary = SessionSummary::new(SessionMode::Practice, 0, 0, 0).unwrap();
        assert_eq!(summary.percentage(), 0);
    }

    #[test]
    fn rejects_inconsistent_counts() {
        assert!(matches!(
            SessionSummary::new(SessionMode::Test, 5, 2, 3),
            Err(SummaryError::ScoreExceedsAnswered { .. })
        ));
        assert!(matches!(
            SessionSummary::new(SessionMode::Test, 2, 3, 1),
            Err(SummaryError::AnsweredExceedsTotal { .. })
        ));
    }
}
