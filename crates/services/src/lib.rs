#![forbid(unsafe_code)]

pub mod content_client;
pub mod error;
pub mod rewards;
pub mod sessions;
pub mod shuffle;
pub mod tracker;

pub use quiz_core::Clock;

pub use content_client::HttpContentStore;
pub use error::{ContentFetchError, SessionError};
pub use rewards::{Rarity, Reward, RewardCollection, Unlock};
pub use shuffle::{shuffle, shuffle_seeded};
pub use tracker::{ProgressStats, ProgressTracker, QuizFamily};

pub use sessions::{
    Advance, QuizSession, RecordedAnswer, SessionPhase, SessionPlan, SessionProgress,
    SessionRunner, Submission, TimerTick,
};
