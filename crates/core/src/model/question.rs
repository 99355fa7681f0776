use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::ids::{AnswerId, QuestionId};

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// How many answer options a question expects to be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
}

impl QuestionKind {
    /// Returns true if at most one option may be selected at a time.
    #[must_use]
    pub fn is_single_select(self) -> bool {
        matches!(self, Self::SingleChoice | Self::TrueFalse)
    }
}

/// Author-assigned confidence tag for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One answer option of a question, with its correctness flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub id: AnswerId,
    pub text: String,
    pub is_correct: bool,
    pub order: u32,
}

/// A question as delivered by the content store.
///
/// Read-only to the core: the content store is trusted to supply exactly one
/// correct option for single-answer kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: QuestionId,
    /// Stable 0-based position within the question set.
    pub order: u32,
    pub text: String,
    pub kind: QuestionKind,
    pub answers: Vec<AnswerOption>,
    pub explanation: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
}

impl QuestionRecord {
    /// IDs of all options flagged correct.
    #[must_use]
    pub fn correct_answer_ids(&self) -> HashSet<AnswerId> {
        self.answers
            .iter()
            .filter(|a| a.is_correct)
            .map(|a| a.id)
            .collect()
    }

    /// Grades a submitted selection.
    ///
    /// The selection is correct only when it equals the correct-option set
    /// exactly: same size, same members. Partial credit is not awarded, and
    /// single-choice questions are the one-element case of the same rule.
    #[must_use]
    pub fn grade(&self, selection: &HashSet<AnswerId>) -> bool {
        if selection.is_empty() {
            return false;
        }
        *selection == self.correct_answer_ids()
    }

    /// Looks up an option by its position in the displayed list.
    #[must_use]
    pub fn option_at(&self, index: usize) -> Option<&AnswerOption> {
        self.answers.get(index)
    }
}
