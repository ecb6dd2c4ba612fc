//! Error types for sqlbook.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlbookError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),

    #[error("Message index out of bounds: {index} (transcript has {len} entries)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Stale revision: expected {expected}, document is at {actual}")]
    StaleRevision { expected: String, actual: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failure of the query executor. Carries only the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct QueryError(pub String);

impl From<sqlx::Error> for QueryError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(db) => QueryError(db.message().to_string()),
            other => QueryError(other.to_string()),
        }
    }
}
