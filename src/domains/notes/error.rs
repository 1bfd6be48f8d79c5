//! Note store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NoteError {
    /// No note with this id.
    #[error("Note not found")]
    NotFound(i64),

    /// The submitted note failed validation.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl NoteError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
