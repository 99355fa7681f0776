use thiserror::Error;

use crate::model::{LedgerError, SummaryError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
}
