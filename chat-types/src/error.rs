//! Error types for the wire format.

use thiserror::Error;

/// Errors raised while encoding or decoding wire payloads.
#[derive(Debug, Error)]
pub enum WireError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// JSON deserialization failed.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}
