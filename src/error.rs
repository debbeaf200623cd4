//! Errors raised while an interactive session is running.

use thiserror::Error;

use crate::book::StoreError;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Ways an interactive session can stop early.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The user pressed the quit key.
    ///
    /// Not a failure: it unwinds the call chain so the command can finish
    /// writing before the process exits.
    #[error("quit requested")]
    Quit,

    /// Reading input or writing output failed (including closed stdin).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisting a field failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    pub fn is_quit(&self) -> bool {
        matches!(self, Self::Quit)
    }
}
