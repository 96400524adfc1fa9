//! # Cashout Core Types
//!
//! Layer 0 of the workspace: the plain data records every other crate speaks.
//! A `Round` is one logged wager, a `MindsetEntry` is one journal record, and a
//! `ChatMessage` is what the coach posts back to the user.
//!
//! Nothing in here performs I/O.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{ChatSender, Mindset, Outcome};
pub use error::CoreError;
pub use structs::{ChatMessage, MindsetEntry, NewMindsetEntry, NewRound, Round};

/// Identifier of the user owning a set of rounds, journal entries and a snapshot.
pub type UserId = String;
