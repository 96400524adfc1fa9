use crate::insights::Commentary;
use crate::metrics::MultiplierBand;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The numeric output of one pass over a user's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBundle {
    // I. Outcome Metrics
    pub total_rounds: usize,
    pub win_rate: Decimal,
    pub avg_multiplier: Decimal,
    pub risk_reward_ratio: Decimal,
    pub total_profit_loss: Decimal,
    pub best_range: MultiplierBand,

    // II. Consistency and Streaks
    pub profit_consistency_score: Decimal,
    pub max_loss_streak: u32,
    pub max_win_streak: u32,

    // III. Behavioral Scores
    pub emotional_bias_score: u32,
    pub revenge_betting_score: u32,
}

/// The latest analytics record for a user.
///
/// A snapshot is only ever produced by a full recomputation and is persisted as a
/// whole-document replace; there is no field-level update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub win_rate: Decimal,
    pub avg_multiplier: Decimal,
    pub risk_reward_ratio: Decimal,
    pub best_range: MultiplierBand,
    pub profit_consistency_score: Decimal,
    pub max_loss_streak: u32,
    pub emotional_bias_score: u32,
    pub revenge_betting_score: u32,
    pub performance_summary: String,
    pub ai_suggestion: String,
    pub ai_comment: String,
    pub last_analyzed: DateTime<Utc>,

    pub total_rounds: usize,
    pub total_profit_loss: Decimal,
    pub max_win_streak: u32,
    pub insights: Vec<String>,
}

impl AnalyticsSnapshot {
    /// Combines computed metrics and their commentary into a snapshot stamped at `analyzed_at`.
    pub fn assemble(metrics: MetricsBundle, commentary: Commentary, analyzed_at: DateTime<Utc>) -> Self {
        Self {
            win_rate: metrics.win_rate,
            avg_multiplier: metrics.avg_multiplier,
            risk_reward_ratio: metrics.risk_reward_ratio,
            best_range: metrics.best_range,
            profit_consistency_score: metrics.profit_consistency_score,
            max_loss_streak: metrics.max_loss_streak,
            emotional_bias_score: metrics.emotional_bias_score,
            revenge_betting_score: metrics.revenge_betting_score,
            performance_summary: commentary.performance_summary,
            ai_suggestion: commentary.ai_suggestion,
            ai_comment: commentary.ai_comment,
            last_analyzed: analyzed_at,
            total_rounds: metrics.total_rounds,
            total_profit_loss: metrics.total_profit_loss,
            max_win_streak: metrics.max_win_streak,
            insights: commentary.insights,
        }
    }

    /// The numeric half of the snapshot, for comparing two computations regardless of when they ran.
    pub fn metrics(&self) -> MetricsBundle {
        MetricsBundle {
            total_rounds: self.total_rounds,
            win_rate: self.win_rate,
            avg_multiplier: self.avg_multiplier,
            risk_reward_ratio: self.risk_reward_ratio,
            total_profit_loss: self.total_profit_loss,
            best_range: self.best_range,
            profit_consistency_score: self.profit_consistency_score,
            max_loss_streak: self.max_loss_streak,
            max_win_streak: self.max_win_streak,
            emotional_bias_score: self.emotional_bias_score,
            revenge_betting_score: self.revenge_betting_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn snapshot_serializes_with_document_field_names() {
        let metrics = MetricsBundle {
            total_rounds: 2,
            win_rate: dec!(50),
            avg_multiplier: dec!(1.75),
            risk_reward_ratio: dec!(1.5),
            total_profit_loss: dec!(5),
            best_range: MultiplierBand::Medium,
            profit_consistency_score: dec!(41.2),
            max_loss_streak: 1,
            max_win_streak: 1,
            emotional_bias_score: 50,
            revenge_betting_score: 20,
        };
        let commentary = Commentary {
            performance_summary: "summary".into(),
            ai_suggestion: "suggestion".into(),
            ai_comment: "comment".into(),
            insights: vec![],
        };
        let snapshot = AnalyticsSnapshot::assemble(metrics.clone(), commentary, Utc::now());
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["bestRange"], "1.5-2.0x");
        assert_eq!(json["revengeBettingScore"], 20);
        assert!(json.get("lastAnalyzed").is_some());
        assert_eq!(snapshot.metrics(), metrics);
    }
}
