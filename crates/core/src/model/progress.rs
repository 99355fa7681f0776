use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::validate::Validate;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LedgerError {
    #[error("totalQuestions must be at least 1, got {0}")]
    InvalidTotal(u32),

    #[error("timesAnswered must be at least 1 for question {index}")]
    InvalidAnswerCount { index: u32 },
}

/// Completion record for one question, created the first time it is answered.
///
/// Re-answering overwrites `answered_at` and `was_correct` and bumps the
/// counter; entries are never deleted individually, only wiped with the
/// whole ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionProgress {
    pub answered_at: DateTime<Utc>,
    pub was_correct: bool,
    pub times_answered: u32,
}

impl QuestionProgress {
    /// First answer for a question.
    #[must_use]
    pub fn first(answered_at: DateTime<Utc>, was_correct: bool) -> Self {
        Self {
            answered_at,
            was_correct,
            times_answered: 1,
        }
    }

    /// Record another answer for the same question.
    pub fn record_again(&mut self, answered_at: DateTime<Utc>, was_correct: bool) {
        self.answered_at = answered_at;
        self.was_correct = was_correct;
        self.times_answered = self.times_answered.saturating_add(1);
    }
}

/// Persisted practice-mode progress for one quiz family.
///
/// Keys of `completed_questions` are 0-based question indices; JSON
/// serialization string-encodes them, matching the persisted layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressLedger {
    pub completed_questions: BTreeMap<u32, QuestionProgress>,
    pub last_position: u32,
    pub shuffle_enabled: bool,
    pub total_questions: u32,
    pub last_updated: DateTime<Utc>,
}

impl ProgressLedger {
    /// Fresh empty ledger stamped with the current question-set size.
    #[must_use]
    pub fn empty(total_questions: u32, now: DateTime<Utc>) -> Self {
        Self {
            completed_questions: BTreeMap::new(),
            last_position: 0,
            shuffle_enabled: false,
            total_questions,
            last_updated: now,
        }
    }

    /// A ledger stamped with a different total belongs to an older question
    /// set; its indices can no longer be trusted.
    #[must_use]
    pub fn is_stale_for(&self, total_questions: u32) -> bool {
        self.total_questions != total_questions
    }

    /// Upsert the progress entry for `index` and move the resume pointer.
    pub fn mark_answered(&mut self, index: u32, was_correct: bool, now: DateTime<Utc>) {
        self.completed_questions
            .entry(index)
            .and_modify(|p| p.record_again(now, was_correct))
            .or_insert_with(|| QuestionProgress::first(now, was_correct));
        self.last_position = index;
        self.last_updated = now;
    }

    /// Number of distinct questions answered at least once.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_questions.len()
    }

    #[must_use]
    pub fn is_completed(&self, index: u32) -> bool {
        self.completed_questions.contains_key(&index)
    }

    /// Lowest index in `0..total` with no entry yet, or `None` once every
    /// question has been answered.
    #[must_use]
    pub fn next_unanswered(&self, total: u32) -> Option<u32> {
        (0..total).find(|i| !self.completed_questions.contains_key(i))
    }
}

impl Validate for ProgressLedger {
    type Error = LedgerError;

    fn validate(&self) -> Result<(), LedgerError> {
        if self.total_questions < 1 {
            return Err(LedgerError::InvalidTotal(self.total_questions));
        }
        for (index, progress) in &self.completed_questions {
            if progress.times_answered < 1 {
                return Err(LedgerError::InvalidAnswerCount { index: *index });
            }
        }
        Ok(())
    }
}
