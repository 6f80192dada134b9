//! Mock transport for testing.
//!
//! Captures sent payloads, lets tests inject inbound payloads, and can
//! simulate going offline or scripted send failures.

use super::{Transport, TransportError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Mock transport for testing.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another. `recv()` awaits injected inbound payloads, which lets the
/// engine consume the mock as a live inbound sequence.
#[derive(Debug)]
pub struct MockTransport {
    shared: Arc<MockShared>,
}

#[derive(Debug)]
struct MockShared {
    state: Mutex<MockState>,
    inbound_tx: mpsc::UnboundedSender<Vec<u8>>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

#[derive(Debug, Default)]
struct MockState {
    connected: bool,
    connected_address: Option<String>,
    sent_messages: Vec<Vec<u8>>,
    send_attempts: u64,
    fail_next_connect: Option<String>,
    failed_send_attempts: HashSet<u64>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            shared: Arc::new(MockShared {
                state: Mutex::new(MockState::default()),
                inbound_tx,
                inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            }),
        }
    }

    /// Inject an inbound payload; the next `recv()` call yields it.
    pub fn push_inbound(&self, data: Vec<u8>) {
        let _ = self.shared.inbound_tx.send(data);
    }

    /// Simulate the link coming up or going down without reconnecting.
    pub fn set_online(&self, online: bool) {
        let mut state = self.shared.state.lock().unwrap();
        state.connected = online;
    }

    /// Get all payloads that were accepted by `send()`.
    pub fn sent_messages(&self) -> Vec<Vec<u8>> {
        let state = self.shared.state.lock().unwrap();
        state.sent_messages.clone()
    }

    /// Get the last payload that was accepted by `send()`.
    pub fn last_sent(&self) -> Option<Vec<u8>> {
        let state = self.shared.state.lock().unwrap();
        state.sent_messages.last().cloned()
    }

    /// Total number of `send()` calls, including rejected ones.
    pub fn send_attempts(&self) -> u64 {
        let state = self.shared.state.lock().unwrap();
        state.send_attempts
    }

    /// Get the address that was connected to.
    pub fn connected_address(&self) -> Option<String> {
        let state = self.shared.state.lock().unwrap();
        state.connected_address.clone()
    }

    /// Cause the next `connect()` to fail with the given error.
    pub fn fail_next_connect(&self, error: &str) {
        let mut state = self.shared.state.lock().unwrap();
        state.fail_next_connect = Some(error.to_string());
    }

    /// Cause the next `send()` to fail.
    pub fn fail_next_send(&self) {
        let mut state = self.shared.state.lock().unwrap();
        let next = state.send_attempts + 1;
        state.failed_send_attempts.insert(next);
    }

    /// Cause the n-th `send()` call (1-based, counted from construction)
    /// to fail.
    pub fn fail_send_attempt(&self, attempt: u64) {
        let mut state = self.shared.state.lock().unwrap();
        state.failed_send_attempts.insert(attempt);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, address: &str) -> Result<(), TransportError> {
        let mut state = self.shared.state.lock().unwrap();

        if let Some(error) = state.fail_next_connect.take() {
            return Err(TransportError::ConnectionFailed(error));
        }

        state.connected = true;
        state.connected_address = Some(address.to_string());
        Ok(())
    }

    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut state = self.shared.state.lock().unwrap();

        state.send_attempts += 1;
        let attempt = state.send_attempts;

        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        if state.failed_send_attempts.remove(&attempt) {
            return Err(TransportError::SendFailed("scripted failure".to_string()));
        }

        state.sent_messages.push(data.to_vec());
        Ok(())
    }

    async fn recv(&self) -> Result<Vec<u8>, TransportError> {
        let mut rx = self.shared.inbound_rx.lock().await;
        rx.recv().await.ok_or(TransportError::ConnectionClosed)
    }

    fn is_connected(&self) -> bool {
        let state = self.shared.state.lock().unwrap();
        state.connected
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut state = self.shared.state.lock().unwrap();
        state.connected = false;
        Ok(())
    }
}
