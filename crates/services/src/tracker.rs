//! Persisted practice-mode progress, one tracker per quiz family.

use log::warn;

use quiz_core::Clock;
use quiz_core::model::ProgressLedger;
use storage::KvStore;

/// A family of questions with its own independent progress ledger.
///
/// Indices are 0-based for every family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizFamily {
    /// Key the ledger persists under. Must live inside the protected
    /// namespace so the quota-recovery pass never evicts it.
    pub storage_key: &'static str,
    /// Question count assumed when no ledger exists yet.
    pub default_total: u32,
}

impl QuizFamily {
    /// The 40-question exam set.
    pub const EXAM_QUESTIONS: Self = Self {
        storage_key: "quizdeck.exam_questions_progress",
        default_total: 40,
    };

    /// The 94-question midterm set.
    pub const MIDTERM_QUIZ: Self = Self {
        storage_key: "quizdeck.midterm_quiz_progress",
        default_total: 94,
    };
}

/// Derived completion statistics for a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStats {
    pub total_questions: u32,
    pub completed_questions: usize,
    /// Completed over total, rounded to the nearest whole percent.
    pub percentage: u32,
    pub last_position: u32,
}

/// Owns the per-question completion ledger for one quiz family.
///
/// Constructed with an injected [`KvStore`] rather than reaching for
/// ambient storage, so tests can run against an in-memory backend. Any
/// storage failure degrades to a no-op with a logged warning; the
/// in-memory session on top is never affected.
#[derive(Clone)]
pub struct ProgressTracker {
    kv: KvStore,
    family: QuizFamily,
    clock: Clock,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(kv: KvStore, family: QuizFamily) -> Self {
        Self {
            kv,
            family,
            clock: Clock::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn family(&self) -> QuizFamily {
        self.family
    }

    /// Load the existing ledger if it matches `total_questions`, otherwise
    /// create and persist a fresh one stamped with that total.
    ///
    /// A stored total disagreeing with the current one means the content
    /// set changed underneath the ledger and its indices can no longer be
    /// trusted; the stale ledger is wiped.
    pub fn initialize(&self, total_questions: u32) -> ProgressLedger {
        self.load_or_init(total_questions)
    }

    /// Record an answer for the question at `index` and move the resume
    /// pointer there.
    ///
    /// Whatever ledger exists is kept as-is, including one stamped with a
    /// caller-supplied total; only [`ProgressTracker::initialize`] judges
    /// staleness.
    pub fn mark_answered(&self, index: u32, was_correct: bool) {
        let mut ledger = self.load_or_default();
        ledger.mark_answered(index, was_correct, self.clock.now());
        self.persist(&ledger);
    }

    /// Move the resume pointer without recording an answer (pure
    /// navigation).
    pub fn update_position(&self, index: u32) {
        let mut ledger = self.load_or_default();
        ledger.last_position = index;
        ledger.last_updated = self.clock.now();
        self.persist(&ledger);
    }

    /// Persist the shuffle toggle shown on the mode-selection screen.
    pub fn set_shuffle_preference(&self, enabled: bool) {
        let mut ledger = self.load_or_default();
        ledger.shuffle_enabled = enabled;
        ledger.last_updated = self.clock.now();
        self.persist(&ledger);
    }

    #[must_use]
    pub fn shuffle_preference(&self) -> bool {
        self.load().map(|l| l.shuffle_enabled).unwrap_or(false)
    }

    /// Completion statistics, zeroed against the family default when no
    /// ledger exists.
    #[must_use]
    pub fn stats(&self) -> ProgressStats {
        match self.load() {
            Some(ledger) => {
                let completed = ledger.completed_count();
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let percentage = ((completed as f64 / f64::from(ledger.total_questions)) * 100.0)
                    .round() as u32;
                ProgressStats {
                    total_questions: ledger.total_questions,
                    completed_questions: completed,
                    percentage,
                    last_position: ledger.last_position,
                }
            }
            None => ProgressStats {
                total_questions: self.family.default_total,
                completed_questions: 0,
                percentage: 0,
                last_position: 0,
            },
        }
    }

    #[must_use]
    pub fn is_completed(&self, index: u32) -> bool {
        self.load().is_some_and(|l| l.is_completed(index))
    }

    /// Sorted list of answered indices.
    #[must_use]
    pub fn completed_questions(&self) -> Vec<u32> {
        self.load()
            .map(|l| l.completed_questions.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Delete the persisted ledger entirely.
    pub fn reset(&self) {
        self.kv.remove(self.family.storage_key);
    }

    /// First index in `0..total_questions` with no recorded answer, or
    /// `None` once every question has been answered. Used to offer
    /// "continue where you left off".
    #[must_use]
    pub fn next_unanswered(&self, total_questions: u32) -> Option<u32> {
        match self.load() {
            Some(ledger) => ledger.next_unanswered(total_questions),
            None => (total_questions > 0).then_some(0),
        }
    }

    fn load(&self) -> Option<ProgressLedger> {
        self.kv.read(self.family.storage_key)
    }

    fn load_or_default(&self) -> ProgressLedger {
        self.load()
            .unwrap_or_else(|| ProgressLedger::empty(self.family.default_total, self.clock.now()))
    }

    fn load_or_init(&self, total_questions: u32) -> ProgressLedger {
        match self.load() {
            Some(ledger) if !ledger.is_stale_for(total_questions) => ledger,
            stale => {
                if stale.is_some() {
                    warn!(
                        "{}: stored total disagrees with current question set, reinitializing",
                        self.family.storage_key
                    );
                }
                let fresh = ProgressLedger::empty(total_questions, self.clock.now());
                self.persist(&fresh);
                fresh
            }
        }
    }

    fn persist(&self, ledger: &ProgressLedger) {
        if !self.kv.write(self.family.storage_key, ledger) {
            warn!(
                "{}: progress not persisted, continuing in memory only",
                self.family.storage_key
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_clock;
    use std::sync::Arc;
    use storage::MemoryBackend;

    fn tracker(family: QuizFamily) -> ProgressTracker {
        let kv = KvStore::new(Arc::new(MemoryBackend::new()));
        ProgressTracker::new(kv, family).with_clock(fixed_clock())
    }

    #[test]
    fn distinct_indices_count_once_each() {
        let tracker = tracker(QuizFamily::EXAM_QUESTIONS);

        tracker.mark_answered(0, true);
        tracker.mark_answered(5, false);
        tracker.mark_answered(5, true);

        let stats = tracker.stats();
        assert_eq!(stats.completed_questions, 2);
        assert_eq!(stats.total_questions, 40);
        assert_eq!(stats.percentage, 5);
        assert_eq!(stats.last_position, 5);
        assert_eq!(tracker.completed_questions(), vec![0, 5]);
    }

    #[test]
    fn stats_default_to_family_total_without_a_ledger() {
        let tracker = tracker(QuizFamily::MIDTERM_QUIZ);
        let stats = tracker.stats();
        assert_eq!(stats.total_questions, 94);
        assert_eq!(stats.completed_questions, 0);
        assert_eq!(stats.percentage, 0);
        assert_eq!(stats.last_position, 0);
    }

    #[test]
    fn reset_returns_to_zeroed_defaults() {
        let tracker = tracker(QuizFamily::EXAM_QUESTIONS);
        tracker.mark_answered(3, true);
        assert_eq!(tracker.stats().completed_questions, 1);

        tracker.reset();

        let stats = tracker.stats();
        assert_eq!(stats.completed_questions, 0);
        assert_eq!(stats.total_questions, 40);
        assert_eq!(tracker.next_unanswered(40), Some(0));
    }

    #[test]
    fn changed_total_discards_the_old_ledger() {
        let tracker = tracker(QuizFamily::EXAM_QUESTIONS);
        tracker.initialize(40);
        tracker.mark_answered(12, true);

        let ledger = tracker.initialize(45);
        assert_eq!(ledger.completed_count(), 0);
        assert_eq!(ledger.total_questions, 45);
        assert_eq!(tracker.stats().completed_questions, 0);
    }

    #[test]
    fn writes_keep_a_ledger_with_a_caller_supplied_total() {
        // A grown question set: the ledger carries 45 questions while
        // the family default is still 40. Answer writes must not judge
        // it stale.
        let tracker = tracker(QuizFamily::EXAM_QUESTIONS);
        tracker.initialize(45);

        for i in 0..10 {
            tracker.mark_answered(i, true);
        }
        tracker.update_position(12);
        tracker.set_shuffle_preference(true);

        let stats = tracker.stats();
        assert_eq!(stats.total_questions, 45);
        assert_eq!(stats.completed_questions, 10);
        assert_eq!(stats.last_position, 12);
        assert!(tracker.shuffle_preference());

        // Re-initializing with the same total keeps everything too.
        let ledger = tracker.initialize(45);
        assert_eq!(ledger.completed_count(), 10);
    }

    #[test]
    fn next_unanswered_scans_from_zero() {
        let tracker = tracker(QuizFamily::EXAM_QUESTIONS);
        assert_eq!(tracker.next_unanswered(40), Some(0));

        tracker.mark_answered(0, true);
        tracker.mark_answered(1, false);
        assert_eq!(tracker.next_unanswered(40), Some(2));

        for i in 0..40 {
            tracker.mark_answered(i, true);
        }
        assert_eq!(tracker.next_unanswered(40), None);
    }

    #[test]
    fn update_position_moves_pointer_without_recording() {
        let tracker = tracker(QuizFamily::EXAM_QUESTIONS);
        tracker.update_position(17);

        let stats = tracker.stats();
        assert_eq!(stats.last_position, 17);
        assert_eq!(stats.completed_questions, 0);
    }

    #[test]
    fn shuffle_preference_round_trips() {
        let tracker = tracker(QuizFamily::MIDTERM_QUIZ);
        assert!(!tracker.shuffle_preference());
        tracker.set_shuffle_preference(true);
        assert!(tracker.shuffle_preference());
    }

    #[test]
    fn failed_storage_degrades_to_no_op() {
        // A zero-byte quota rejects every write; the tracker must keep
        // answering queries with defaults instead of crashing.
        let kv = KvStore::new(Arc::new(MemoryBackend::with_byte_limit(0)));
        let tracker = ProgressTracker::new(kv, QuizFamily::EXAM_QUESTIONS).with_clock(fixed_clock());

        tracker.mark_answered(0, true);
        let stats = tracker.stats();
        assert_eq!(stats.completed_questions, 0);
        assert_eq!(tracker.next_unanswered(40), Some(0));
    }
}
