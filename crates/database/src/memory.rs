use crate::error::DbError;
use crate::store::PerformanceStore;
use analytics::AnalyticsSnapshot;
use async_trait::async_trait;
use core_types::{ChatMessage, MindsetEntry, Round};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default, Clone)]
struct UserDocuments {
    rounds: Vec<Round>,
    mindset_entries: Vec<MindsetEntry>,
    snapshot: Option<AnalyticsSnapshot>,
    chat: Vec<ChatMessage>,
}

/// A process-local `PerformanceStore`.
///
/// Records are kept in insertion order, which lets tests feed the engine
/// deliberately unsorted histories.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<String, UserDocuments>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PerformanceStore for InMemoryStore {
    async fn insert_round(&self, user_id: &str, round: &Round) -> Result<(), DbError> {
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().rounds.push(round.clone());
        Ok(())
    }

    async fn insert_mindset_entry(&self, user_id: &str, entry: &MindsetEntry) -> Result<(), DbError> {
        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_default()
            .mindset_entries
            .push(entry.clone());
        Ok(())
    }

    async fn fetch_rounds(&self, user_id: &str) -> Result<Vec<Round>, DbError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).map(|u| u.rounds.clone()).unwrap_or_default())
    }

    async fn fetch_mindset_entries(&self, user_id: &str) -> Result<Vec<MindsetEntry>, DbError> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .map(|u| u.mindset_entries.clone())
            .unwrap_or_default())
    }

    async fn replace_snapshot(&self, user_id: &str, snapshot: &AnalyticsSnapshot) -> Result<(), DbError> {
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().snapshot = Some(snapshot.clone());
        Ok(())
    }

    async fn latest_snapshot(&self, user_id: &str) -> Result<Option<AnalyticsSnapshot>, DbError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).and_then(|u| u.snapshot.clone()))
    }

    async fn post_chat_message(&self, user_id: &str, message: &ChatMessage) -> Result<(), DbError> {
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().chat.push(message.clone());
        Ok(())
    }

    async fn fetch_chat_messages(&self, user_id: &str) -> Result<Vec<ChatMessage>, DbError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).map(|u| u.chat.clone()).unwrap_or_default())
    }

    async fn list_users(&self) -> Result<Vec<String>, DbError> {
        let users = self.users.read().await;
        let mut ids: Vec<String> = users
            .iter()
            .filter(|(_, docs)| !docs.rounds.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}
