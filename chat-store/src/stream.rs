//! Live, level-triggered views over the message store.
//!
//! Both streams emit the current full snapshot on the first call to
//! `next()`, then wait for the store's change signal and re-query. Because
//! the snapshot is re-derived from the store every time, a consumer can
//! never drift from the durable state, and coalesced change notifications
//! are harmless.

use crate::{MessageStore, StoreError};
use chat_types::{ChatId, Message};
use std::sync::Arc;
use tokio::sync::watch;

/// Live sequence of all messages for one chat, ascending by timestamp.
///
/// Re-emits the full list whenever the underlying set changes.
pub struct ChatStream {
    store: Arc<dyn MessageStore>,
    chat_id: ChatId,
    changes: watch::Receiver<u64>,
    primed: bool,
}

impl ChatStream {
    /// Create a stream over the given chat.
    pub fn new(store: Arc<dyn MessageStore>, chat_id: ChatId) -> Self {
        let changes = store.changes();
        Self {
            store,
            chat_id,
            changes,
            primed: false,
        }
    }

    /// The chat this stream observes.
    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    /// Next snapshot: immediately on the first call, then after every
    /// store change.
    pub async fn next(&mut self) -> Result<Vec<Message>, StoreError> {
        if self.primed {
            // The sender lives inside the store we hold an Arc to, so the
            // channel cannot close underneath us.
            let _ = self.changes.changed().await;
        }
        self.primed = true;
        self.store.messages_for_chat(&self.chat_id).await
    }
}

/// Live sequence of "one message per chat, the one with the maximum
/// timestamp", newest chat first.
pub struct LatestStream {
    store: Arc<dyn MessageStore>,
    changes: watch::Receiver<u64>,
    primed: bool,
}

impl LatestStream {
    /// Create a latest-per-chat stream over the store.
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        let changes = store.changes();
        Self {
            store,
            changes,
            primed: false,
        }
    }

    /// Next snapshot: immediately on the first call, then after every
    /// store change.
    pub async fn next(&mut self) -> Result<Vec<Message>, StoreError> {
        if self.primed {
            let _ = self.changes.changed().await;
        }
        self.primed = true;
        self.store.latest_per_chat().await
    }
}
