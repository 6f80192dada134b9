//! Error types for chat-engine.

use chat_store::StoreError;
use chat_types::WireError;
use thiserror::Error;

/// Errors surfaced to callers of the engine.
///
/// Transport failures never appear here: they are recovered locally by
/// queueing and reported as [`crate::SendOutcome::Queued`]. Store failures
/// are fatal to the affected operation and surfaced distinctly.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Persistence is unavailable.
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),

    /// Outbound payload could not be encoded.
    #[error("wire encoding failed: {0}")]
    Wire(#[from] WireError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }
}
