#![allow(dead_code)]

use analytics::AnalyticsSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use core_types::{ChatMessage, MindsetEntry, NewRound, Round};
use database::{DbError, InMemoryStore, PerformanceStore};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 4, 20, 0, 0).unwrap()
}

/// Settles a round logged `minutes` after `t0`.
pub fn round_at(minutes: i64, amount: Decimal, multiplier: Decimal, crash_point: Decimal) -> Round {
    Round::settle(
        NewRound {
            amount,
            cash_out_multiplier: multiplier,
            crash_point,
            mindset: None,
            notes: None,
        },
        t0() + Duration::minutes(minutes),
    )
    .unwrap()
}

pub fn entry_at(minutes: i64, bias: u8) -> MindsetEntry {
    MindsetEntry {
        id: uuid::Uuid::new_v4(),
        confidence: 7,
        discipline_score: 7,
        emotional_bias_score: bias,
        pre_session_goals: None,
        lessons_learned: None,
        timestamp: t0() + Duration::minutes(minutes),
    }
}

/// An `InMemoryStore` whose reads and snapshot writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    pub fail_fetch: AtomicBool,
    pub fail_write: AtomicBool,
    pub writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_write(&self, fail: bool) {
        self.fail_write.store(fail, Ordering::SeqCst);
    }

    fn check_fetch(&self) -> Result<(), DbError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(DbError::ConnectionError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl PerformanceStore for FlakyStore {
    async fn insert_round(&self, user_id: &str, round: &Round) -> Result<(), DbError> {
        self.inner.insert_round(user_id, round).await
    }

    async fn insert_mindset_entry(&self, user_id: &str, entry: &MindsetEntry) -> Result<(), DbError> {
        self.inner.insert_mindset_entry(user_id, entry).await
    }

    async fn fetch_rounds(&self, user_id: &str) -> Result<Vec<Round>, DbError> {
        self.check_fetch()?;
        self.inner.fetch_rounds(user_id).await
    }

    async fn fetch_mindset_entries(&self, user_id: &str) -> Result<Vec<MindsetEntry>, DbError> {
        self.check_fetch()?;
        self.inner.fetch_mindset_entries(user_id).await
    }

    async fn replace_snapshot(&self, user_id: &str, snapshot: &AnalyticsSnapshot) -> Result<(), DbError> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(DbError::ConnectionError(sqlx::Error::Protocol("write rejected".into())));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.replace_snapshot(user_id, snapshot).await
    }

    async fn latest_snapshot(&self, user_id: &str) -> Result<Option<AnalyticsSnapshot>, DbError> {
        self.inner.latest_snapshot(user_id).await
    }

    async fn post_chat_message(&self, user_id: &str, message: &ChatMessage) -> Result<(), DbError> {
        self.inner.post_chat_message(user_id, message).await
    }

    async fn fetch_chat_messages(&self, user_id: &str) -> Result<Vec<ChatMessage>, DbError> {
        self.inner.fetch_chat_messages(user_id).await
    }

    async fn list_users(&self) -> Result<Vec<String>, DbError> {
        self.inner.list_users().await
    }
}

/// An `InMemoryStore` whose `fetch_rounds` parks until `release` is notified,
/// signalling `entered` once a read has started.
#[derive(Default)]
pub struct GatedStore {
    pub inner: InMemoryStore,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PerformanceStore for GatedStore {
    async fn insert_round(&self, user_id: &str, round: &Round) -> Result<(), DbError> {
        self.inner.insert_round(user_id, round).await
    }

    async fn insert_mindset_entry(&self, user_id: &str, entry: &MindsetEntry) -> Result<(), DbError> {
        self.inner.insert_mindset_entry(user_id, entry).await
    }

    async fn fetch_rounds(&self, user_id: &str) -> Result<Vec<Round>, DbError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.fetch_rounds(user_id).await
    }

    async fn fetch_mindset_entries(&self, user_id: &str) -> Result<Vec<MindsetEntry>, DbError> {
        self.inner.fetch_mindset_entries(user_id).await
    }

    async fn replace_snapshot(&self, user_id: &str, snapshot: &AnalyticsSnapshot) -> Result<(), DbError> {
        self.inner.replace_snapshot(user_id, snapshot).await
    }

    async fn latest_snapshot(&self, user_id: &str) -> Result<Option<AnalyticsSnapshot>, DbError> {
        self.inner.latest_snapshot(user_id).await
    }

    async fn post_chat_message(&self, user_id: &str, message: &ChatMessage) -> Result<(), DbError> {
        self.inner.post_chat_message(user_id, message).await
    }

    async fn fetch_chat_messages(&self, user_id: &str) -> Result<Vec<ChatMessage>, DbError> {
        self.inner.fetch_chat_messages(user_id).await
    }

    async fn list_users(&self) -> Result<Vec<String>, DbError> {
        self.inner.list_users().await
    }
}
