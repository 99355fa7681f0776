use std::collections::{BTreeSet, HashMap, HashSet};

use quiz_core::model::{
    AnswerId, QuestionId, QuestionRecord, SessionConfig, SessionSummary, SummaryError,
};

use crate::error::SessionError;
use crate::sessions::plan::SessionPlan;
use crate::sessions::progress::SessionProgress;

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Questions are being presented and answered.
    Active,
    /// Walking back through answered questions after completion.
    Reviewing,
    /// No further answers are accepted.
    Completed,
}

/// Where `next`/`skip` landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Question(usize),
    Completed,
}

/// Outcome of one countdown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Untimed session, or not currently active.
    Inactive,
    Remaining(u32),
    Expired,
}

/// A graded answer kept for review and scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAnswer {
    pub question_id: QuestionId,
    pub selection: HashSet<AnswerId>,
    pub correct: bool,
}

/// What `submit` graded, for callers that persist outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    /// Index within the session sequence.
    pub index: usize,
    /// Stable question `order` within the source set.
    pub order: u32,
    pub correct: bool,
}

/// One quiz run: a fixed question sequence, a cursor, and the answers
/// recorded so far.
///
/// The sequence is immutable after construction. Answers are keyed by
/// sequence index; once a question's result is revealed its recorded
/// answer is read-only for the rest of the run.
#[derive(Debug, Clone)]
pub struct QuizSession {
    config: SessionConfig,
    questions: Vec<QuestionRecord>,
    current: usize,
    selection: HashSet<AnswerId>,
    focused_option: usize,
    answers: HashMap<usize, RecordedAnswer>,
    skipped: BTreeSet<usize>,
    result_revealed: bool,
    time_left: Option<u32>,
    phase: SessionPhase,
}

impl QuizSession {
    /// Starts a session over a built plan.
    ///
    /// An empty plan produces a session that is already completed.
    #[must_use]
    pub fn new(plan: SessionPlan, config: SessionConfig) -> Self {
        let phase = if plan.is_empty() {
            SessionPhase::Completed
        } else {
            SessionPhase::Active
        };
        let time_left = config.time_limit_secs;

        Self {
            config,
            current: plan.start_index,
            questions: plan.questions,
            selection: HashSet::new(),
            focused_option: 0,
            answers: HashMap::new(),
            skipped: BTreeSet::new(),
            result_revealed: false,
            time_left,
            phase,
        }
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Index of the question under the cursor.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question under the cursor, if the sequence is non-empty.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn selection(&self) -> &HashSet<AnswerId> {
        &self.selection
    }

    /// Whether the current question's result has been revealed.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.result_revealed
    }

    #[must_use]
    pub fn focused_option(&self) -> usize {
        self.focused_option
    }

    /// Seconds left on the countdown, `None` when untimed.
    #[must_use]
    pub fn time_left(&self) -> Option<u32> {
        self.time_left
    }

    /// The recorded answer for a sequence index, if one exists.
    #[must_use]
    pub fn recorded_answer(&self, index: usize) -> Option<&RecordedAnswer> {
        self.answers.get(&index)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let answered = self.answers.len();
        SessionProgress {
            total,
            answered,
            skipped: self.skipped.len(),
            remaining: total - answered,
            is_complete: self.phase == SessionPhase::Completed,
        }
    }

    //
    // ─── SELECTION ─────────────────────────────────────────────────────────────
    //

    /// Toggles (multi-select) or replaces (single-select) an option in the
    /// working selection. Ignored once the result is revealed, and outside
    /// the active phase.
    pub fn select(&mut self, answer: AnswerId) {
        if self.phase != SessionPhase::Active || self.result_revealed {
            return;
        }
        let Some(question) = self.questions.get(self.current) else {
            return;
        };

        if question.kind.is_single_select() {
            self.selection.clear();
            self.selection.insert(answer);
        } else if !self.selection.remove(&answer) {
            self.selection.insert(answer);
        }
    }

    /// Moves keyboard focus to the next option, wrapping at the end.
    pub fn focus_next(&mut self) {
        let Some(count) = self.option_count() else {
            return;
        };
        self.focused_option = (self.focused_option + 1) % count;
    }

    /// Moves keyboard focus to the previous option, wrapping at the start.
    pub fn focus_prev(&mut self) {
        let Some(count) = self.option_count() else {
            return;
        };
        self.focused_option = (self.focused_option + count - 1) % count;
    }

    /// Selects the option under keyboard focus.
    pub fn select_focused(&mut self) {
        let id = self
            .current_question()
            .and_then(|q| q.option_at(self.focused_option))
            .map(|a| a.id);
        if let Some(id) = id {
            self.select(id);
        }
    }

    /// Selects an option by its 1-based display number. Out-of-range
    /// numbers are ignored.
    pub fn select_by_number(&mut self, number: usize) {
        if number == 0 {
            return;
        }
        let id = self
            .current_question()
            .and_then(|q| q.option_at(number - 1))
            .map(|a| a.id);
        if let Some(id) = id {
            self.focused_option = number - 1;
            self.select(id);
        }
    }

    fn option_count(&self) -> Option<usize> {
        match self.current_question() {
            Some(q) if !q.answers.is_empty() => Some(q.answers.len()),
            _ => None,
        }
    }

    //
    // ─── ANSWERING AND NAVIGATION ──────────────────────────────────────────────
    //

    /// Grades the working selection against the current question and
    /// reveals the result.
    ///
    /// # Errors
    ///
    /// `Completed` outside the active phase, `AlreadyAnswered` if this
    /// question's result was already revealed, `NoSelection` when nothing
    /// is selected.
    pub fn submit(&mut self) -> Result<Submission, SessionError> {
        if self.phase != SessionPhase::Active {
            return Err(SessionError::Completed);
        }
        if self.result_revealed {
            return Err(SessionError::AlreadyAnswered);
        }
        if self.selection.is_empty() {
            return Err(SessionError::NoSelection);
        }
        let Some(question) = self.questions.get(self.current) else {
            return Err(SessionError::Completed);
        };

        let correct = question.grade(&self.selection);
        self.answers.insert(
            self.current,
            RecordedAnswer {
                question_id: question.id,
                selection: self.selection.clone(),
                correct,
            },
        );
        self.skipped.remove(&self.current);
        self.result_revealed = true;

        Ok(Submission {
            index: self.current,
            order: question.order,
            correct,
        })
    }

    /// Marks the current question skipped (unless already answered) and
    /// advances.
    pub fn skip(&mut self) -> Advance {
        if self.phase != SessionPhase::Active {
            return Advance::Completed;
        }
        if !self.result_revealed {
            self.skipped.insert(self.current);
        }
        self.advance_from_current()
    }

    /// Moves the cursor forward. Past the end of the sequence the cursor
    /// returns to the earliest skipped question; with none left the
    /// session completes.
    pub fn next(&mut self) -> Advance {
        if self.phase != SessionPhase::Active {
            return Advance::Completed;
        }
        self.advance_from_current()
    }

    fn advance_from_current(&mut self) -> Advance {
        let candidate = self.current + 1;
        if candidate < self.questions.len() {
            self.land_on(candidate);
            return Advance::Question(candidate);
        }

        // End of the sequence: circle back to the earliest skipped
        // question, or finish.
        match self.skipped.iter().next().copied() {
            Some(index) => {
                self.land_on(index);
                Advance::Question(index)
            }
            None => {
                self.complete();
                Advance::Completed
            }
        }
    }

    /// Jumps straight to a sequence index, clamped to the last question.
    pub fn jump(&mut self, index: usize) -> Advance {
        if self.phase != SessionPhase::Active || self.questions.is_empty() {
            return Advance::Completed;
        }
        let index = index.min(self.questions.len() - 1);
        self.land_on(index);
        Advance::Question(index)
    }

    /// Positions the cursor and restores the view state for that question:
    /// a recorded answer comes back revealed and read-only, anything else
    /// starts fresh.
    fn land_on(&mut self, index: usize) {
        self.current = index;
        self.focused_option = 0;
        match self.answers.get(&index) {
            Some(recorded) => {
                self.selection = recorded.selection.clone();
                self.result_revealed = true;
            }
            None => {
                self.selection.clear();
                self.result_revealed = false;
            }
        }
    }

    fn complete(&mut self) {
        self.phase = SessionPhase::Completed;
        self.selection.clear();
        self.result_revealed = false;
    }

    //
    // ─── TIMER ─────────────────────────────────────────────────────────────────
    //

    /// Advances the countdown by one second. Reaching zero completes the
    /// session; the in-flight selection is discarded, not graded.
    pub fn tick(&mut self) -> TimerTick {
        if self.phase != SessionPhase::Active {
            return TimerTick::Inactive;
        }
        let Some(remaining) = self.time_left else {
            return TimerTick::Inactive;
        };

        let remaining = remaining.saturating_sub(1);
        self.time_left = Some(remaining);
        if remaining == 0 {
            self.complete();
            return TimerTick::Expired;
        }
        TimerTick::Remaining(remaining)
    }

    /// Ends the session immediately, regardless of remaining questions.
    pub fn finish(&mut self) {
        if self.phase == SessionPhase::Active {
            self.complete();
        }
    }

    //
    // ─── SCORING AND REVIEW ────────────────────────────────────────────────────
    //

    /// Scores the run as it stands.
    ///
    /// # Errors
    ///
    /// Propagates `SummaryError` if the recorded counts are inconsistent;
    /// with answers only entering through `submit` that does not happen.
    pub fn summary(&self) -> Result<SessionSummary, SummaryError> {
        let score = self.answers.values().filter(|a| a.correct).count();
        SessionSummary::new(
            self.config.mode,
            self.questions.len(),
            self.answers.len(),
            score,
        )
    }

    /// Switches a completed, non-empty session into review, starting at
    /// the first question with every result revealed.
    pub fn begin_review(&mut self) {
        if self.phase != SessionPhase::Completed || self.questions.is_empty() {
            return;
        }
        self.phase = SessionPhase::Reviewing;
        self.review_land_on(0);
    }

    /// Steps review forward; past the last question drops back to the
    /// completed phase.
    pub fn review_next(&mut self) {
        if self.phase != SessionPhase::Reviewing {
            return;
        }
        let candidate = self.current + 1;
        if candidate < self.questions.len() {
            self.review_land_on(candidate);
        } else {
            self.phase = SessionPhase::Completed;
        }
    }

    /// Steps review backward; past the first question drops back to the
    /// completed phase.
    pub fn review_prev(&mut self) {
        if self.phase != SessionPhase::Reviewing {
            return;
        }
        match self.current.checked_sub(1) {
            Some(candidate) => self.review_land_on(candidate),
            None => self.phase = SessionPhase::Completed,
        }
    }

    fn review_land_on(&mut self, index: usize) {
        self.current = index;
        self.focused_option = 0;
        self.result_revealed = true;
        self.selection = self
            .answers
            .get(&index)
            .map(|a| a.selection.clone())
            .unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerOption, QuestionKind, SessionMode};

    fn question(order: u32, kind: QuestionKind, correctness: &[bool]) -> QuestionRecord {
        QuestionRecord {
            id: QuestionId::random(),
            order,
            text: format!("question {order}"),
            kind,
            answers: correctness
                .iter()
                .enumerate()
                .map(|(i, &is_correct)| AnswerOption {
                    id: AnswerId::random(),
                    text: format!("option {i}"),
                    is_correct,
                    order: i as u32,
                })
                .collect(),
            explanation: None,
            difficulty: None,
            category: None,
        }
    }

    fn single_choice_set(n: u32) -> Vec<QuestionRecord> {
        // First option correct on every question.
        (0..n)
            .map(|order| question(order, QuestionKind::SingleChoice, &[true, false, false]))
            .collect()
    }

    fn practice_session(questions: Vec<QuestionRecord>) -> QuizSession {
        let config = SessionConfig::practice();
        let plan = SessionPlan::build(&questions, &config);
        QuizSession::new(plan, config)
    }

    fn answer_current(session: &mut QuizSession, option: usize) -> Submission {
        let id = session.current_question().unwrap().answers[option].id;
        session.select(id);
        session.submit().unwrap()
    }

    #[test]
    fn empty_plan_starts_completed() {
        let session = practice_session(Vec::new());
        assert_eq!(session.phase(), SessionPhase::Completed);
        assert!(session.is_empty());
        assert_eq!(session.summary().unwrap().percentage(), 0);
    }

    #[test]
    fn three_of_five_scores_sixty_percent() {
        let mut session = practice_session(single_choice_set(5));

        for i in 0..5 {
            // Correct on the first three, wrong on the rest.
            let option = if i < 3 { 0 } else { 1 };
            let submission = answer_current(&mut session, option);
            assert_eq!(submission.correct, i < 3);
            session.next();
        }

        assert_eq!(session.phase(), SessionPhase::Completed);
        let summary = session.summary().unwrap();
        assert_eq!(summary.score(), 3);
        assert_eq!(summary.answered(), 5);
        assert_eq!(summary.percentage(), 60);
    }

    #[test]
    fn single_select_replaces_previous_selection() {
        let mut session = practice_session(single_choice_set(1));
        let q = session.current_question().unwrap().clone();

        session.select(q.answers[1].id);
        session.select(q.answers[0].id);
        assert_eq!(session.selection().len(), 1);
        assert!(session.selection().contains(&q.answers[0].id));
    }

    #[test]
    fn multi_select_toggles_and_grades_exact_set() {
        let q = question(0, QuestionKind::MultipleChoice, &[true, true, false]);
        let ids: Vec<AnswerId> = q.answers.iter().map(|a| a.id).collect();
        let mut session = practice_session(vec![q]);

        session.select(ids[0]);
        session.select(ids[2]);
        session.select(ids[2]); // toggle off
        session.select(ids[1]);

        let submission = session.submit().unwrap();
        assert!(submission.correct);
    }

    #[test]
    fn submit_guards_reject_bad_states() {
        let mut session = practice_session(single_choice_set(2));

        assert!(matches!(session.submit(), Err(SessionError::NoSelection)));

        answer_current(&mut session, 0);
        assert!(matches!(
            session.submit(),
            Err(SessionError::AlreadyAnswered)
        ));

        session.finish();
        assert!(matches!(session.submit(), Err(SessionError::Completed)));
    }

    #[test]
    fn selection_is_frozen_after_reveal() {
        let mut session = practice_session(single_choice_set(1));
        let other = session.current_question().unwrap().answers[1].id;

        answer_current(&mut session, 0);
        session.select(other);
        assert!(!session.selection().contains(&other));
    }

    #[test]
    fn skipped_question_comes_back_at_the_end() {
        let mut session = practice_session(single_choice_set(3));

        answer_current(&mut session, 0);
        session.next();
        assert_eq!(session.skip(), Advance::Question(2));
        answer_current(&mut session, 0);

        // Past the end, the cursor returns to the skipped question.
        assert_eq!(session.next(), Advance::Question(1));
        assert!(!session.is_revealed());
        answer_current(&mut session, 0);

        // Forward lands on the already-answered tail, revealed, before
        // the run can finish.
        assert_eq!(session.next(), Advance::Question(2));
        assert!(session.is_revealed());
        assert_eq!(session.next(), Advance::Completed);
        assert_eq!(session.summary().unwrap().score(), 3);
    }

    #[test]
    fn landing_on_an_answered_question_restores_the_record() {
        let mut session = practice_session(single_choice_set(3));
        let chosen = session.current_question().unwrap().answers[0].id;

        answer_current(&mut session, 0);
        session.next();
        session.jump(0);

        assert!(session.is_revealed());
        assert!(session.selection().contains(&chosen));
    }

    #[test]
    fn jump_clamps_to_last_question() {
        let mut session = practice_session(single_choice_set(3));
        assert_eq!(session.jump(99), Advance::Question(2));
    }

    #[test]
    fn keyboard_focus_wraps_and_selects() {
        let mut session = practice_session(single_choice_set(1));
        let q = session.current_question().unwrap().clone();

        session.focus_prev();
        assert_eq!(session.focused_option(), 2);
        session.focus_next();
        assert_eq!(session.focused_option(), 0);

        session.select_by_number(2);
        assert!(session.selection().contains(&q.answers[1].id));

        session.select_by_number(9); // out of range, ignored
        assert!(session.selection().contains(&q.answers[1].id));

        session.focus_next();
        session.focus_next();
        session.select_focused();
        assert!(session.selection().contains(&q.answers[2].id));
    }

    #[test]
    fn timer_expiry_completes_without_grading() {
        let config = SessionConfig::test(3, 1).with_shuffle(false);
        let questions = single_choice_set(3);
        let plan = SessionPlan::build(&questions, &config);
        let mut session = QuizSession::new(plan, config);

        answer_current(&mut session, 0);
        session.next();
        // Select but never submit; expiry must not grade it.
        let pending = session.current_question().unwrap().answers[0].id;
        session.select(pending);

        for _ in 0..59 {
            assert!(matches!(session.tick(), TimerTick::Remaining(_)));
        }
        assert_eq!(session.tick(), TimerTick::Expired);
        assert_eq!(session.phase(), SessionPhase::Completed);
        assert_eq!(session.tick(), TimerTick::Inactive);

        let summary = session.summary().unwrap();
        assert_eq!(summary.answered(), 1);
        assert_eq!(summary.mode(), SessionMode::Test);
    }

    #[test]
    fn untimed_session_never_expires() {
        let mut session = practice_session(single_choice_set(1));
        assert_eq!(session.tick(), TimerTick::Inactive);
    }

    #[test]
    fn review_walks_recorded_answers() {
        let mut session = practice_session(single_choice_set(2));
        answer_current(&mut session, 0);
        session.next();
        answer_current(&mut session, 1);
        session.next();
        assert_eq!(session.phase(), SessionPhase::Completed);

        session.begin_review();
        assert_eq!(session.phase(), SessionPhase::Reviewing);
        assert_eq!(session.current_index(), 0);
        assert!(session.is_revealed());
        assert!(session.recorded_answer(0).unwrap().correct);

        session.review_next();
        assert_eq!(session.current_index(), 1);
        assert!(!session.recorded_answer(1).unwrap().correct);

        session.review_next();
        assert_eq!(session.phase(), SessionPhase::Completed);
    }

    #[test]
    fn review_prev_past_start_returns_to_completed() {
        let mut session = practice_session(single_choice_set(1));
        answer_current(&mut session, 0);
        session.next();

        session.begin_review();
        session.review_prev();
        assert_eq!(session.phase(), SessionPhase::Completed);
    }

    #[test]
    fn review_on_an_empty_session_is_a_no_op() {
        let mut session = practice_session(Vec::new());
        session.begin_review();
        assert_eq!(session.phase(), SessionPhase::Completed);
    }
}
