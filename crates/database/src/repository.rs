use crate::DbError;
use crate::store::PerformanceStore;
use analytics::AnalyticsSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{ChatMessage, Mindset, MindsetEntry, Round};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use sqlx::postgres::PgPool;
use uuid::Uuid;

/// The `DbRepository` is the PostgreSQL-backed `PerformanceStore`. It encapsulates
/// all SQL queries and row mapping.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// Database-specific round struct that matches the `rounds` table schema.
#[derive(Debug, Clone, FromRow)]
struct DbRound {
    round_id: Uuid,
    amount: Decimal,
    cash_out_multiplier: Decimal,
    crash_point: Decimal,
    outcome: String,
    profit: Decimal,
    mindset: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<DbRound> for Round {
    type Error = DbError;

    fn try_from(row: DbRound) -> Result<Self, Self::Error> {
        Ok(Round {
            id: row.round_id,
            amount: row.amount,
            cash_out_multiplier: row.cash_out_multiplier,
            crash_point: row.crash_point,
            outcome: row.outcome.parse()?,
            profit: row.profit,
            mindset: row.mindset.as_deref().map(str::parse::<Mindset>).transpose()?,
            notes: row.notes,
            timestamp: row.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct DbMindsetEntry {
    entry_id: Uuid,
    confidence: i16,
    discipline_score: i16,
    emotional_bias_score: i16,
    pre_session_goals: Option<String>,
    lessons_learned: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<DbMindsetEntry> for MindsetEntry {
    type Error = DbError;

    fn try_from(row: DbMindsetEntry) -> Result<Self, Self::Error> {
        Ok(MindsetEntry {
            id: row.entry_id,
            confidence: small_score("confidence", row.confidence)?,
            discipline_score: small_score("discipline_score", row.discipline_score)?,
            emotional_bias_score: small_score("emotional_bias_score", row.emotional_bias_score)?,
            pre_session_goals: row.pre_session_goals,
            lessons_learned: row.lessons_learned,
            timestamp: row.created_at,
        })
    }
}

fn small_score(column: &str, value: i16) -> Result<u8, DbError> {
    u8::try_from(value).map_err(|_| DbError::CorruptRecord(format!("{column} out of range: {value}")))
}

fn non_negative(column: &str, value: i32) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|_| DbError::CorruptRecord(format!("{column} is negative: {value}")))
}

/// Row of the `analytics_snapshots` table.
#[derive(Debug, Clone, FromRow)]
struct DbSnapshot {
    win_rate: Decimal,
    avg_multiplier: Decimal,
    risk_reward_ratio: Decimal,
    best_range: String,
    profit_consistency_score: Decimal,
    max_loss_streak: i32,
    emotional_bias_score: i32,
    revenge_betting_score: i32,
    performance_summary: String,
    ai_suggestion: String,
    ai_comment: String,
    last_analyzed: DateTime<Utc>,
    total_rounds: i32,
    total_profit_loss: Decimal,
    max_win_streak: i32,
    insights: JsonValue,
}

impl TryFrom<DbSnapshot> for AnalyticsSnapshot {
    type Error = DbError;

    fn try_from(row: DbSnapshot) -> Result<Self, Self::Error> {
        Ok(AnalyticsSnapshot {
            win_rate: row.win_rate,
            avg_multiplier: row.avg_multiplier,
            risk_reward_ratio: row.risk_reward_ratio,
            best_range: row.best_range.parse()?,
            profit_consistency_score: row.profit_consistency_score,
            max_loss_streak: non_negative("max_loss_streak", row.max_loss_streak)?,
            emotional_bias_score: non_negative("emotional_bias_score", row.emotional_bias_score)?,
            revenge_betting_score: non_negative("revenge_betting_score", row.revenge_betting_score)?,
            performance_summary: row.performance_summary,
            ai_suggestion: row.ai_suggestion,
            ai_comment: row.ai_comment,
            last_analyzed: row.last_analyzed,
            total_rounds: non_negative("total_rounds", row.total_rounds)? as usize,
            total_profit_loss: row.total_profit_loss,
            max_win_streak: non_negative("max_win_streak", row.max_win_streak)?,
            insights: serde_json::from_value(row.insights)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct DbChatMessage {
    message_id: Uuid,
    text: String,
    sender: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<DbChatMessage> for ChatMessage {
    type Error = DbError;

    fn try_from(row: DbChatMessage) -> Result<Self, Self::Error> {
        Ok(ChatMessage {
            id: row.message_id,
            text: row.text,
            sender: row.sender.parse()?,
            timestamp: row.created_at,
        })
    }
}

fn to_i32(column: &str, value: u64) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|_| DbError::CorruptRecord(format!("{column} does not fit in INTEGER: {value}")))
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PerformanceStore for DbRepository {
    async fn insert_round(&self, user_id: &str, round: &Round) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO rounds (
                round_id, user_id, amount, cash_out_multiplier, crash_point,
                outcome, profit, mindset, notes, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(round.id)
        .bind(user_id)
        .bind(round.amount)
        .bind(round.cash_out_multiplier)
        .bind(round.crash_point)
        .bind(round.outcome.as_str())
        .bind(round.profit)
        .bind(round.mindset.map(|m| m.as_str()))
        .bind(round.notes.as_deref())
        .bind(round.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_mindset_entry(&self, user_id: &str, entry: &MindsetEntry) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO mindset_entries (
                entry_id, user_id, confidence, discipline_score, emotional_bias_score,
                pre_session_goals, lessons_learned, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(user_id)
        .bind(i16::from(entry.confidence))
        .bind(i16::from(entry.discipline_score))
        .bind(i16::from(entry.emotional_bias_score))
        .bind(entry.pre_session_goals.as_deref())
        .bind(entry.lessons_learned.as_deref())
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_rounds(&self, user_id: &str) -> Result<Vec<Round>, DbError> {
        let rows = sqlx::query_as::<_, DbRound>(
            r#"
            SELECT round_id, amount, cash_out_multiplier, crash_point, outcome, profit, mindset, notes, created_at
            FROM rounds
            WHERE user_id = $1
            ORDER BY created_at, round_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Round::try_from).collect()
    }

    async fn fetch_mindset_entries(&self, user_id: &str) -> Result<Vec<MindsetEntry>, DbError> {
        let rows = sqlx::query_as::<_, DbMindsetEntry>(
            r#"
            SELECT entry_id, confidence, discipline_score, emotional_bias_score,
                   pre_session_goals, lessons_learned, created_at
            FROM mindset_entries
            WHERE user_id = $1
            ORDER BY created_at DESC, entry_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MindsetEntry::try_from).collect()
    }

    /// Upserts every column in one statement so the row is never half-written.
    async fn replace_snapshot(&self, user_id: &str, snapshot: &AnalyticsSnapshot) -> Result<(), DbError> {
        let insights = serde_json::to_value(&snapshot.insights)?;

        sqlx::query(
            r#"
            INSERT INTO analytics_snapshots (
                user_id, win_rate, avg_multiplier, risk_reward_ratio, best_range,
                profit_consistency_score, max_loss_streak, emotional_bias_score, revenge_betting_score,
                performance_summary, ai_suggestion, ai_comment, last_analyzed,
                total_rounds, total_profit_loss, max_win_streak, insights
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17
            )
            ON CONFLICT (user_id) DO UPDATE SET
                win_rate = EXCLUDED.win_rate,
                avg_multiplier = EXCLUDED.avg_multiplier,
                risk_reward_ratio = EXCLUDED.risk_reward_ratio,
                best_range = EXCLUDED.best_range,
                profit_consistency_score = EXCLUDED.profit_consistency_score,
                max_loss_streak = EXCLUDED.max_loss_streak,
                emotional_bias_score = EXCLUDED.emotional_bias_score,
                revenge_betting_score = EXCLUDED.revenge_betting_score,
                performance_summary = EXCLUDED.performance_summary,
                ai_suggestion = EXCLUDED.ai_suggestion,
                ai_comment = EXCLUDED.ai_comment,
                last_analyzed = EXCLUDED.last_analyzed,
                total_rounds = EXCLUDED.total_rounds,
                total_profit_loss = EXCLUDED.total_profit_loss,
                max_win_streak = EXCLUDED.max_win_streak,
                insights = EXCLUDED.insights
            "#,
        )
        .bind(user_id)
        .bind(snapshot.win_rate)
        .bind(snapshot.avg_multiplier)
        .bind(snapshot.risk_reward_ratio)
        .bind(snapshot.best_range.label())
        .bind(snapshot.profit_consistency_score)
        .bind(to_i32("max_loss_streak", snapshot.max_loss_streak.into())?)
        .bind(to_i32("emotional_bias_score", snapshot.emotional_bias_score.into())?)
        .bind(to_i32("revenge_betting_score", snapshot.revenge_betting_score.into())?)
        .bind(&snapshot.performance_summary)
        .bind(&snapshot.ai_suggestion)
        .bind(&snapshot.ai_comment)
        .bind(snapshot.last_analyzed)
        .bind(to_i32("total_rounds", snapshot.total_rounds as u64)?)
        .bind(snapshot.total_profit_loss)
        .bind(to_i32("max_win_streak", snapshot.max_win_streak.into())?)
        .bind(insights)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn latest_snapshot(&self, user_id: &str) -> Result<Option<AnalyticsSnapshot>, DbError> {
        let row = sqlx::query_as::<_, DbSnapshot>(
            r#"
            SELECT win_rate, avg_multiplier, risk_reward_ratio, best_range, profit_consistency_score,
                   max_loss_streak, emotional_bias_score, revenge_betting_score,
                   performance_summary, ai_suggestion, ai_comment, last_analyzed,
                   total_rounds, total_profit_loss, max_win_streak, insights
            FROM analytics_snapshots
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AnalyticsSnapshot::try_from).transpose()
    }

    async fn post_chat_message(&self, user_id: &str, message: &ChatMessage) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO chat_messages (message_id, user_id, text, sender, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(message.id)
        .bind(user_id)
        .bind(&message.text)
        .bind(message.sender.as_str())
        .bind(message.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_chat_messages(&self, user_id: &str) -> Result<Vec<ChatMessage>, DbError> {
        let rows = sqlx::query_as::<_, DbChatMessage>(
            "SELECT message_id, text, sender, created_at FROM chat_messages WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChatMessage::try_from).collect()
    }

    async fn list_users(&self) -> Result<Vec<String>, DbError> {
        let users: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT user_id FROM rounds ORDER BY user_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users.into_iter().map(|(id,)| id).collect())
    }
}
