//! # Cashout Engine
//!
//! Recomputes a user's analytics snapshot whenever they log a round.
//!
//! - `AnalysisOrchestrator` loads the full history through an injected
//!   `PerformanceStore`, runs the `AnalyticsEngine`, and replaces the stored snapshot.
//!   It is a best-effort background job: failures are logged and reported as an
//!   `AnalysisOutcome`, never raised.
//! - `RecomputeTrigger` turns `RoundCreated` events into orchestrator runs and
//!   publishes the result as an `AnalysisEvent`.

pub mod error;
pub mod orchestrator;
pub mod trigger;

pub use error::EngineError;
pub use orchestrator::{AnalysisOrchestrator, AnalysisOutcome};
pub use trigger::{RecomputeTrigger, TriggerState, run_trigger_service};
