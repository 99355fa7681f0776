//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::SummaryError;

/// Errors emitted by the quiz session state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session is no longer accepting answers")]
    Completed,

    #[error("current question already has a recorded answer")]
    AlreadyAnswered,

    #[error("no answer option selected")]
    NoSelection,

    #[error(transparent)]
    Summary(#[from] SummaryError),
}

/// Errors emitted while fetching questions from a remote content store.
///
/// All of these are non-fatal: the session simply never starts, and the
/// host offers a path back to mode selection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentFetchError {
    #[error("content request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("content payload could not be decoded: {0}")]
    Decode(String),
}
