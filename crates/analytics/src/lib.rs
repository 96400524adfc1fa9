//! # Cashout Analytics Engine
//!
//! This crate derives a behavioral performance snapshot from a user's round history
//! and mindset journal.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of storage or
//!   notification. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every calculator in `metrics` is a free function over an
//!   already-ordered slice. The `AnalyticsEngine` wires them together and the
//!   `insights` module turns the numbers into coaching text.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: Runs every calculator and assembles an `AnalyticsSnapshot`.
//! - `MetricsBundle`: The numeric half of a snapshot.
//! - `AnalyticsSnapshot`: The complete, typed record persisted per user.
//! - `MultiplierBand`: The four fixed cash-out bands used by `best_range`.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod insights;
pub mod metrics;
pub mod snapshot;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use insights::Commentary;
pub use metrics::MultiplierBand;
pub use snapshot::{AnalyticsSnapshot, MetricsBundle};
