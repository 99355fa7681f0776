mod ids;
mod progress;
mod question;
mod session;

pub use ids::{AnswerId, QuestionId};

pub use progress::{LedgerError, ProgressLedger, QuestionProgress};
pub use question::{AnswerOption, Difficulty, QuestionKind, QuestionRecord};
pub use session::{SessionConfig, SessionMode, SessionSummary, SummaryError};
