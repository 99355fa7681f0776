use quiz_core::model::{SessionMode, SessionSummary, SummaryError};

use crate::error::SessionError;
use crate::sessions::machine::{Advance, QuizSession, Submission, TimerTick};
use crate::sessions::progress::SessionProgress;
use crate::tracker::ProgressTracker;

/// Drives a [`QuizSession`] and mirrors practice outcomes into the
/// durable progress ledger.
///
/// Test runs are throwaway simulations; the runner never persists
/// anything for them. A runner without a tracker behaves like one whose
/// storage is unavailable.
pub struct SessionRunner {
    session: QuizSession,
    tracker: Option<ProgressTracker>,
}

impl SessionRunner {
    #[must_use]
    pub fn new(session: QuizSession, tracker: Option<ProgressTracker>) -> Self {
        Self { session, tracker }
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Direct access for selection and focus handling; answering and
    /// navigation should go through the runner so outcomes persist.
    pub fn session_mut(&mut self) -> &mut QuizSession {
        &mut self.session
    }

    /// Submits the working selection, recording the outcome in the
    /// ledger for practice runs.
    ///
    /// # Errors
    ///
    /// Propagates the session's submit guards unchanged.
    pub fn submit(&mut self) -> Result<Submission, SessionError> {
        let submission = self.session.submit()?;
        if self.persists() {
            if let Some(tracker) = &self.tracker {
                tracker.mark_answered(submission.order, submission.correct);
            }
        }
        Ok(submission)
    }

    pub fn next(&mut self) -> Advance {
        let advance = self.session.next();
        self.remember_position(advance);
        advance
    }

    pub fn skip(&mut self) -> Advance {
        let advance = self.session.skip();
        self.remember_position(advance);
        advance
    }

    pub fn jump(&mut self, index: usize) -> Advance {
        let advance = self.session.jump(index);
        self.remember_position(advance);
        advance
    }

    pub fn tick(&mut self) -> TimerTick {
        self.session.tick()
    }

    pub fn finish(&mut self) {
        self.session.finish();
    }

    /// Scores the run as it stands.
    ///
    /// # Errors
    ///
    /// Propagates `SummaryError` on inconsistent recorded counts.
    pub fn summary(&self) -> Result<SessionSummary, SummaryError> {
        self.session.summary()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.session.progress()
    }

    fn persists(&self) -> bool {
        self.session.config().mode == SessionMode::Practice
    }

    fn remember_position(&mut self, advance: Advance) {
        if !self.persists() {
            return;
        }
        let Advance::Question(_) = advance else {
            return;
        };
        let order = self.session.current_question().map(|q| q.order);
        if let (Some(order), Some(tracker)) = (order, &self.tracker) {
            tracker.update_position(order);
        }
    }
}
