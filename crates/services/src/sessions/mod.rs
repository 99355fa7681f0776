mod machine;
mod plan;
mod progress;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use machine::{Advance, QuizSession, RecordedAnswer, SessionPhase, Submission, TimerTick};
pub use plan::SessionPlan;
pub use progress::SessionProgress;
pub use workflow::SessionRunner;
