//! # chat-core
//!
//! Pure logic for the chat-sync engine (no I/O, instant tests).
//!
//! All modules in this crate are **pure** - they take input and produce
//! output without side effects. The actual I/O (network, disk) is performed
//! by `chat-engine`, which drives these state holders.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod gate;
pub mod summary;

pub use gate::ConnectivityGate;
pub use summary::SummaryList;
