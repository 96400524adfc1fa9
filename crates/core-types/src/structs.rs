use crate::enums::{ChatSender, Mindset, Outcome};
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The user-supplied part of a round, before it is settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRound {
    /// Stake size. Must be strictly positive.
    pub amount: Decimal,
    /// Multiplier at which the user cashed out, `0` if they never did.
    pub cash_out_multiplier: Decimal,
    /// The multiplier at which the round crashed.
    pub crash_point: Decimal,
    pub mindset: Option<Mindset>,
    pub notes: Option<String>,
}

/// A single logged wager. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: Uuid,
    pub amount: Decimal,
    pub cash_out_multiplier: Decimal,
    pub crash_point: Decimal,
    pub outcome: Outcome,
    /// Signed result: `amount * (multiplier - 1)` on a win, `-amount` on a loss.
    pub profit: Decimal,
    pub mindset: Option<Mindset>,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Round {
    /// Validates a `NewRound` and derives its outcome and profit.
    ///
    /// A round is a win iff the user cashed out (`multiplier > 0`) no later than
    /// the crash point.
    pub fn settle(new: NewRound, timestamp: DateTime<Utc>) -> Result<Self, CoreError> {
        if new.amount <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "amount".to_string(),
                format!("stake must be positive, got {}", new.amount),
            ));
        }
        if new.cash_out_multiplier.is_sign_negative() {
            return Err(CoreError::InvalidInput(
                "cash_out_multiplier".to_string(),
                format!("must not be negative, got {}", new.cash_out_multiplier),
            ));
        }
        if new.crash_point.is_sign_negative() {
            return Err(CoreError::InvalidInput(
                "crash_point".to_string(),
                format!("must not be negative, got {}", new.crash_point),
            ));
        }

        let (outcome, profit) = settle_outcome(new.amount, new.cash_out_multiplier, new.crash_point)
            .ok_or_else(|| {
                CoreError::InvalidInput(
                    "amount".to_string(),
                    format!(
                        "profit of {} at {}x is out of range",
                        new.amount, new.cash_out_multiplier
                    ),
                )
            })?;

        Ok(Self {
            id: Uuid::new_v4(),
            amount: new.amount,
            cash_out_multiplier: new.cash_out_multiplier,
            crash_point: new.crash_point,
            outcome,
            profit,
            mindset: new.mindset,
            notes: new.notes,
            timestamp,
        })
    }
}

/// Computes the outcome and signed profit of a stake, or `None` if the profit
/// does not fit in a `Decimal`.
pub fn settle_outcome(amount: Decimal, multiplier: Decimal, crash_point: Decimal) -> Option<(Outcome, Decimal)> {
    if multiplier > Decimal::ZERO && multiplier <= crash_point {
        let profit = amount.checked_mul(multiplier.checked_sub(Decimal::ONE)?)?;
        Some((Outcome::Win, profit))
    } else {
        Some((Outcome::Loss, -amount))
    }
}

/// The user-supplied part of a journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMindsetEntry {
    pub confidence: u8,
    pub discipline_score: u8,
    pub emotional_bias_score: u8,
    pub pre_session_goals: Option<String>,
    pub lessons_learned: Option<String>,
}

/// An immutable mindset journal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindsetEntry {
    pub id: Uuid,
    /// 1-10.
    pub confidence: u8,
    /// 1-10.
    pub discipline_score: u8,
    /// 0-100, self-reported.
    pub emotional_bias_score: u8,
    pub pre_session_goals: Option<String>,
    pub lessons_learned: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl MindsetEntry {
    /// Validates the score ranges of a `NewMindsetEntry` and stamps it.
    pub fn record(new: NewMindsetEntry, timestamp: DateTime<Utc>) -> Result<Self, CoreError> {
        check_range("confidence", new.confidence, 1, 10)?;
        check_range("discipline_score", new.discipline_score, 1, 10)?;
        check_range("emotional_bias_score", new.emotional_bias_score, 0, 100)?;

        Ok(Self {
            id: Uuid::new_v4(),
            confidence: new.confidence,
            discipline_score: new.discipline_score,
            emotional_bias_score: new.emotional_bias_score,
            pre_session_goals: new.pre_session_goals,
            lessons_learned: new.lessons_learned,
            timestamp,
        })
    }
}

fn check_range(field: &str, value: u8, min: u8, max: u8) -> Result<(), CoreError> {
    if value < min || value > max {
        return Err(CoreError::InvalidInput(
            field.to_string(),
            format!("expected {min}-{max}, got {value}"),
        ));
    }
    Ok(())
}

/// A message in the user's coaching chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: ChatSender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn from_ai(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: ChatSender::Ai,
            timestamp: Utc::now(),
        }
    }
}
