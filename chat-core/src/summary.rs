//! Chat summary list - one entry per chat, newest first.
//!
//! The summary is a performance cache owned by the engine: it is always
//! re-derivable from a latest-message-per-chat query against the store.
//! Updates are a full deterministic resort, not an incremental patch, so
//! the cache cannot drift from the store ordering.

use chat_types::{Chat, Message};

/// Ordered chat summaries, descending by timestamp, one entry per chat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryList {
    entries: Vec<Chat>,
}

impl SummaryList {
    /// Create an empty summary list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the summary from a latest-message-per-chat query result.
    pub fn from_latest(latest: &[Message]) -> Self {
        let mut list = Self {
            entries: latest.iter().map(Chat::from_latest).collect(),
        };
        list.resort();
        list
    }

    /// Fold a newly reconciled message into the summary: drop any existing
    /// entry for its chat, insert the new one, resort.
    pub fn apply(&mut self, message: &Message) {
        self.entries.retain(|chat| chat.id != message.chat_id);
        self.entries.push(Chat::from_latest(message));
        self.resort();
    }

    /// The current entries, newest chat first.
    pub fn entries(&self) -> &[Chat] {
        &self.entries
    }

    /// Owned copy of the current entries.
    pub fn to_vec(&self) -> Vec<Chat> {
        self.entries.clone()
    }

    fn resort(&mut self) {
        // Stable, so equal timestamps keep their relative order.
        self.entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }
}
