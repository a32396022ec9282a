use sea_orm::{DbErr, TransactionError};
use thiserror::Error;

/// Error taxonomy for engine operations.
///
/// `Rejected` is a logical failure (room full, target missing, bad status)
/// surfaced to the client as `{success: false, error}` with HTTP 200;
/// `Db` is an unexpected storage failure surfaced as HTTP 500 with the
/// detail only logged server-side.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("{0}")]
    Rejected(String),
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

impl GameError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        GameError::Rejected(msg.into())
    }
}

impl From<TransactionError<GameError>> for GameError {
    fn from(err: TransactionError<GameError>) -> Self {
        match err {
            TransactionError::Connection(e) => GameError::Db(e),
            TransactionError::Transaction(e) => e,
        }
    }
}
