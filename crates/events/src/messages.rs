use chrono::{DateTime, Utc};
use core_types::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fired by the ingestion flow once a round has been stored. This is the only
/// event that starts a recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundCreated {
    pub user_id: UserId,
    pub round_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl RoundCreated {
    pub fn new(user_id: impl Into<UserId>, round_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            round_id,
            created_at: Utc::now(),
        }
    }
}

/// The coaching text of a freshly written snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNotice {
    pub user_id: UserId,
    pub performance_summary: String,
    pub ai_comment: String,
    pub ai_suggestion: String,
    pub last_analyzed: DateTime<Utc>,
}

/// A recompute that stopped at the minimum-sample guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSkipped {
    pub user_id: UserId,
    pub rounds: usize,
    pub required: usize,
}

/// A recompute that failed while reading history or writing the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub user_id: UserId,
    pub reason: String,
}

/// Published by the recompute trigger after every invocation.
///
/// Serialized as `{ "type": "...", "payload": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum AnalysisEvent {
    /// A new snapshot has replaced the previous one.
    SnapshotUpdated(SnapshotNotice),
    /// Not enough rounds yet; nothing was written.
    Skipped(AnalysisSkipped),
    /// Fetch or write failed; the previous snapshot is still current.
    Failed(AnalysisFailure),
}

impl AnalysisEvent {
    pub fn user_id(&self) -> &str {
        match self {
            AnalysisEvent::SnapshotUpdated(n) => &n.user_id,
            AnalysisEvent::Skipped(s) => &s.user_id,
            AnalysisEvent::Failed(f) => &f.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_events_are_adjacently_tagged() {
        let event = AnalysisEvent::Skipped(AnalysisSkipped {
            user_id: "u1".into(),
            rounds: 2,
            required: 5,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Skipped");
        assert_eq!(json["payload"]["required"], 5);
        assert_eq!(event.user_id(), "u1");
    }
}
