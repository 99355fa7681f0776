use quiz_core::model::{QuestionRecord, SessionConfig};

use crate::shuffle::{shuffle, shuffle_seeded};

/// The materialized question sequence for one session run.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub questions: Vec<QuestionRecord>,
    /// Index the run opens on (resume position, or 0).
    pub start_index: usize,
}

impl SessionPlan {
    /// Sequence the source list for a run.
    ///
    /// Shuffling happens *before* the limit is applied, so a limited
    /// session draws a uniform random subset of the source instead of a
    /// biased prefix. A resume order is honored only for unshuffled runs
    /// (a shuffled sequence has no stable position to return to); an
    /// order that no longer exists falls back to the start.
    #[must_use]
    pub fn build(source: &[QuestionRecord], config: &SessionConfig) -> Self {
        Self::sequence(source, config, None)
    }

    /// Same as [`SessionPlan::build`] but with a deterministic shuffle,
    /// for reproducing a run across reloads.
    #[must_use]
    pub fn build_seeded(source: &[QuestionRecord], config: &SessionConfig, seed: u64) -> Self {
        Self::sequence(source, config, Some(seed))
    }

    fn sequence(source: &[QuestionRecord], config: &SessionConfig, seed: Option<u64>) -> Self {
        let mut questions = if config.shuffle {
            match seed {
                Some(seed) => shuffle_seeded(source, seed),
                None => shuffle(source),
            }
        } else {
            source.to_vec()
        };

        if let Some(limit) = config.limit {
            questions.truncate(limit);
        }

        let start_index = match config.resume_from {
            Some(order) if !config.shuffle => questions
                .iter()
                .position(|q| q.order == order)
                .unwrap_or(0),
            _ => 0,
        };

        Self {
            questions,
            start_index,
        }
    }

    /// Total number of questions in this plan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Returns true when the plan holds no questions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
