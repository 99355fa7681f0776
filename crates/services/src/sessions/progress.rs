/// Snapshot of how far a running session has gotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub skipped: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Answered share of the sequence, rounded to a whole percent.
    #[must_use]
    pub fn percent_answered(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            ((self.answered as f64 / self.total as f64) * 100.0).round() as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_answered_rounds() {
        let progress = SessionProgress {
            total: 3,
            answered: 1,
            skipped: 0,
            remaining: 2,
            is_complete: false,
        };
        assert_eq!(progress.percent_answered(), 33);
    }

    #[test]
    fn empty_sequence_counts_as_done() {
        let progress = SessionProgress {
            total: 0,
            answered: 0,
            skipped: 0,
            remaining: 0,
            is_complete: true,
        };
        assert_eq!(progress.percent_answered(), 100);
    }
}
