//! Error types for chat-store.

use thiserror::Error;

/// Storage layer errors.
///
/// The engine treats these as fatal to the affected operation; they are
/// surfaced distinctly from transport failures, which are recovered by
/// queueing.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row carried a status value the model does not know.
    #[error("corrupt status column: {status}")]
    CorruptStatus {
        /// The unrecognized column value.
        status: String,
    },
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
