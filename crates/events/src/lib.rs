//! # Cashout Events
//!
//! This crate defines the messages exchanged between the round ingestion flow, the
//! recompute trigger and the notification service.
//!
//! As a Layer 0 crate, it depends only on `core-types`.

// Declare the modules that make up this crate.
pub mod messages;

// Re-export the core types to provide a clean public API.
pub use messages::{AnalysisEvent, AnalysisFailure, AnalysisSkipped, RoundCreated, SnapshotNotice};
