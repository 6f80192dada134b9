//! # chat-types
//!
//! Data model and wire format types for the chat-sync engine.
//!
//! This crate provides the foundational types used across all chat-sync
//! crates:
//! - [`MessageId`], [`ChatId`] - opaque identity types
//! - [`Message`], [`MessageStatus`], [`Chat`] - the domain model
//! - [`WirePayload`], [`Inbound`] - the flat key/value wire shape and
//!   inbound payload classification
//! - [`WireError`] - wire-level error type

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod message;
mod wire;

pub use error::WireError;
pub use ids::{ChatId, MessageId};
pub use message::{now_millis, Chat, Message, MessageStatus};
pub use wire::{Inbound, WirePayload, SERVER_SENDER};
