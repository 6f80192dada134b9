//! The domain model: messages and derived chat summaries.

use crate::{ChatId, MessageId};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Delivery status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageStatus {
    /// Delivered to the transport (or received from the remote peer).
    Sent,
    /// Durably persisted, not yet delivered, eligible for retry.
    Queued,
    /// Reserved: never assigned automatically, retries run indefinitely.
    Failed,
}

impl MessageStatus {
    /// Stable string form, used as the storage column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "SENT",
            Self::Queued => "QUEUED",
            Self::Failed => "FAILED",
        }
    }

    /// Parse the storage column value back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SENT" => Some(Self::Sent),
            "QUEUED" => Some(Self::Queued),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A single chat message.
///
/// The pair `(id, chat_id)` uniquely identifies a stored message;
/// re-insertion with the same key replaces the prior record, which is what
/// makes retries idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// The conversation this message belongs to.
    pub chat_id: ChatId,
    /// Message body.
    pub text: String,
    /// Display identity of the originator.
    pub sender: String,
    /// Milliseconds since epoch, assigned at creation/reception time.
    pub timestamp: i64,
    /// Delivery status.
    pub status: MessageStatus,
}

impl Message {
    /// Build a locally composed outbound message: fresh id, current
    /// timestamp, optimistic [`MessageStatus::Sent`].
    pub fn outbound(text: impl Into<String>, sender: impl Into<String>, chat_id: ChatId) -> Self {
        Self {
            id: MessageId::random(),
            chat_id,
            text: text.into(),
            sender: sender.into(),
            timestamp: now_millis(),
            status: MessageStatus::Sent,
        }
    }

    /// Copy of this message with a different status.
    pub fn with_status(&self, status: MessageStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

/// A conversation summary entry, derived from the latest message per chat.
///
/// Never persisted directly; always materialized from the message store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    /// Equals the `chat_id` of its messages.
    pub id: ChatId,
    /// Text of the message with the maximum timestamp in this chat.
    pub last_message: String,
    /// Timestamp of that message, milliseconds since epoch.
    pub timestamp: i64,
}

impl Chat {
    /// Summary entry for a chat whose latest message is `message`.
    pub fn from_latest(message: &Message) -> Self {
        Self {
            id: message.chat_id.clone(),
            last_message: message.text.clone(),
            timestamp: message.timestamp,
        }
    }
}

/// Current time as milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
