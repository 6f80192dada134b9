//! Channel adapter: translates between raw transport payloads and the
//! engine's message shape.
//!
//! Outbound messages are serialized to the flat JSON wire shape. Inbound
//! payloads are classified as structured or plain text; a parse failure
//! degrades to the text path and never drops the payload. Transport-level
//! send failures surface as an explicit [`ChannelError::TransportUnavailable`]
//! result, which the engine turns into a queued outcome - queueing is a
//! first-class result, not an exception handler side effect.

use crate::transport::{Transport, TransportError};
use chat_types::{Inbound, WireError, WirePayload};
use thiserror::Error;

/// Channel adapter errors.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The transport did not accept the write, or is disconnected.
    ///
    /// Always recovered locally by queueing; never a hard error.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The inbound side of the connection has terminated.
    #[error("channel closed")]
    Closed,

    /// Outbound payload could not be encoded. A local bug, not a
    /// connectivity problem.
    #[error("wire encoding failed: {0}")]
    Encode(#[from] WireError),
}

/// Owns one logical connection to the remote peer.
pub struct ChannelAdapter<T> {
    transport: T,
}

impl<T: Transport> ChannelAdapter<T> {
    /// Wrap a transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Attempt to establish the connection.
    ///
    /// Connection failures are connectivity-adjacent, not caller errors:
    /// they are logged and the engine later recovers through the
    /// connectivity gate and queue drain.
    pub async fn connect(&self, address: &str) {
        match self.transport.connect(address).await {
            Ok(()) => tracing::debug!(address, "channel connected"),
            Err(err) => tracing::warn!(%err, address, "channel connect failed"),
        }
    }

    /// Best-effort send of a structured payload.
    ///
    /// Ok means the transport accepted the write, not end-to-end delivery.
    pub async fn send(&self, payload: &WirePayload) -> Result<(), ChannelError> {
        let bytes = payload.to_bytes()?;
        self.transport
            .send(&bytes)
            .await
            .map_err(|err| ChannelError::TransportUnavailable(err.to_string()))
    }

    /// Await the next inbound payload, normalized to a tagged variant.
    pub async fn next_inbound(&self) -> Result<Inbound, ChannelError> {
        let bytes = self.transport.recv().await.map_err(|err| match err {
            TransportError::ConnectionClosed => ChannelError::Closed,
            other => ChannelError::TransportUnavailable(other.to_string()),
        })?;
        Ok(Inbound::classify(&bytes))
    }

    /// Whether the transport is currently connected.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Close the connection.
    pub async fn disconnect(&self) {
        if let Err(err) = self.transport.close().await {
            tracing::warn!(%err, "channel close failed");
        }
    }
}
