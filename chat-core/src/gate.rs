//! Connectivity gate - NO I/O, just edge detection.
//!
//! The gate holds the last-known boolean connectivity and decides when a
//! queue drain pass must run: exactly on the offline-to-online transition.
//! Repeated "online" notifications from a noisy signal source must not
//! re-trigger a drain (edge-triggered, not level-triggered).

/// Last-known connectivity with edge detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityGate {
    connected: bool,
}

impl ConnectivityGate {
    /// Create a gate in the disconnected state.
    ///
    /// Starting disconnected means the very first "online" update triggers
    /// a drain, which picks up messages queued in a prior run.
    pub fn new() -> Self {
        Self { connected: false }
    }

    /// Process a connectivity update.
    ///
    /// Returns `true` when a drain pass must be triggered, i.e. only on the
    /// offline-to-online edge.
    pub fn update(&mut self, connected: bool) -> bool {
        let was_disconnected = !self.connected;
        self.connected = connected;
        connected && was_disconnected
    }

    /// The last-known connectivity.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl Default for ConnectivityGate {
    fn default() -> Self {
        Self::new()
    }
}
