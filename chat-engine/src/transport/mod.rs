//! Transport abstraction for the chat-sync engine.
//!
//! This module provides a pluggable transport layer that abstracts the
//! underlying bidirectional connection (WebSocket in production, mock for
//! testing).
//!
//! # Design
//!
//! The transport trait is async and connection-oriented:
//! - `connect()` establishes a connection
//! - `send()` transmits raw payload bytes, best effort
//! - `recv()` awaits the next inbound payload
//! - `close()` gracefully terminates
//!
//! `send()` reports whether the transport accepted the write, not
//! end-to-end delivery. The engine relies on that failure signal to decide
//! to queue.

mod mock;

pub use mock::MockTransport;

use async_trait::async_trait;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected.
    #[error("not connected")]
    NotConnected,

    /// Connection closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Trait for sending and receiving raw channel payloads.
///
/// Implementations own one logical connection to the remote peer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the peer at the given address.
    async fn connect(&self, address: &str) -> Result<(), TransportError>;

    /// Send payload bytes over the connection.
    ///
    /// Must report failure rather than silently drop when the transport is
    /// not currently connected.
    async fn send(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Await the next inbound payload.
    ///
    /// Returns [`TransportError::ConnectionClosed`] once the inbound side
    /// has terminated for good.
    async fn recv(&self) -> Result<Vec<u8>, TransportError>;

    /// Check if currently connected.
    fn is_connected(&self) -> bool;

    /// Close the connection gracefully.
    async fn close(&self) -> Result<(), TransportError>;
}
