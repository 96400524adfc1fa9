use crate::error::DbError;
use analytics::AnalyticsSnapshot;
use async_trait::async_trait;
use core_types::{ChatMessage, MindsetEntry, Round};

/// The per-user document store the analytics engine reads from and writes to.
///
/// Fetch methods return a user's whole collection. Callers must not rely on the
/// order of the returned records.
#[async_trait]
pub trait PerformanceStore: Send + Sync {
    /// Appends a settled round to the user's history.
    async fn insert_round(&self, user_id: &str, round: &Round) -> Result<(), DbError>;

    /// Appends a journal entry to the user's mindset journal.
    async fn insert_mindset_entry(&self, user_id: &str, entry: &MindsetEntry) -> Result<(), DbError>;

    async fn fetch_rounds(&self, user_id: &str) -> Result<Vec<Round>, DbError>;

    async fn fetch_mindset_entries(&self, user_id: &str) -> Result<Vec<MindsetEntry>, DbError>;

    /// Atomically replaces the user's latest snapshot with `snapshot`.
    async fn replace_snapshot(&self, user_id: &str, snapshot: &AnalyticsSnapshot) -> Result<(), DbError>;

    async fn latest_snapshot(&self, user_id: &str) -> Result<Option<AnalyticsSnapshot>, DbError>;

    async fn post_chat_message(&self, user_id: &str, message: &ChatMessage) -> Result<(), DbError>;

    /// The user's chat log, oldest first.
    async fn fetch_chat_messages(&self, user_id: &str) -> Result<Vec<ChatMessage>, DbError>;

    /// Every user that has logged at least one round.
    async fn list_users(&self) -> Result<Vec<String>, DbError>;
}
