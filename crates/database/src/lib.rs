//! # Cashout Database Crate
//!
//! This crate is the per-user document store behind the analytics engine. Every user
//! owns a collection of rounds, a mindset journal, a chat log and exactly one
//! "latest" analytics snapshot.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** All persistence goes through the `PerformanceStore` trait. The
//!   engine receives a store as an explicit dependency and never knows which backend
//!   it is talking to.
//! - **Whole-Document Snapshot Writes:** `replace_snapshot` overwrites every field of the
//!   user's snapshot in a single statement. Readers never observe a mix of two computations.
//! - **Asynchronous & Pooled:** The PostgreSQL backend uses a connection pool (`PgPool`).
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: Establish the pool and bring the schema up to date.
//! - `PerformanceStore`: The storage contract.
//! - `DbRepository`: The PostgreSQL implementation.
//! - `InMemoryStore`: A process-local implementation, used by tests and dry runs.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use memory::InMemoryStore;
pub use repository::DbRepository;
pub use store::PerformanceStore;
