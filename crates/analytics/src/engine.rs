use crate::error::AnalyticsError;
use crate::insights::Commentary;
use crate::metrics;
use crate::snapshot::{AnalyticsSnapshot, MetricsBundle};
use chrono::{DateTime, Utc};
use core_types::{MindsetEntry, Round};

/// A stateless calculator for deriving a behavioral snapshot from a user's history.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every metric calculator.
    ///
    /// # Arguments
    ///
    /// * `rounds` - The user's full round history, oldest first.
    /// * `mindset_entries` - The user's journal, newest first.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `MetricsBundle`, or an `AnalyticsError` if either
    /// input is out of order.
    pub fn calculate(
        &self,
        rounds: &[Round],
        mindset_entries: &[MindsetEntry],
    ) -> Result<MetricsBundle, AnalyticsError> {
        check_ordering(rounds, mindset_entries)?;

        Ok(MetricsBundle {
            total_rounds: rounds.len(),
            win_rate: metrics::win_rate(rounds),
            avg_multiplier: metrics::avg_multiplier(rounds),
            risk_reward_ratio: metrics::risk_reward(rounds),
            total_profit_loss: metrics::total_profit_loss(rounds),
            best_range: metrics::best_range(rounds),
            profit_consistency_score: metrics::profit_consistency(rounds),
            max_loss_streak: metrics::max_loss_streak(rounds),
            max_win_streak: metrics::max_win_streak(rounds),
            emotional_bias_score: metrics::emotional_correlation(rounds, mindset_entries),
            revenge_betting_score: metrics::revenge_betting_score(rounds),
        })
    }

    /// Computes metrics and commentary and stamps the result with `analyzed_at`.
    pub fn analyze(
        &self,
        rounds: &[Round],
        mindset_entries: &[MindsetEntry],
        analyzed_at: DateTime<Utc>,
    ) -> Result<AnalyticsSnapshot, AnalyticsError> {
        let metrics = self.calculate(rounds, mindset_entries)?;
        let commentary = Commentary::generate(&metrics, rounds, mindset_entries);
        Ok(AnalyticsSnapshot::assemble(metrics, commentary, analyzed_at))
    }
}

fn check_ordering(rounds: &[Round], mindset_entries: &[MindsetEntry]) -> Result<(), AnalyticsError> {
    if let Some(i) = rounds.windows(2).position(|w| w[1].timestamp < w[0].timestamp) {
        return Err(AnalyticsError::UnsortedRounds { index: i + 1 });
    }
    if let Some(i) = mindset_entries.windows(2).position(|w| w[1].timestamp > w[0].timestamp) {
        return Err(AnalyticsError::UnsortedMindsetEntries { index: i + 1 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{DISCIPLINE_SUGGESTION, STABLE_COMMENT};
    use crate::metrics::MultiplierBand;
    use crate::test_support::{entry, loss, win};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn two_round_history_produces_the_expected_metrics() {
        let rounds = vec![loss(0, dec!(10)), win(1, dec!(20), dec!(1.75))];
        let m = AnalyticsEngine::new().calculate(&rounds, &[]).unwrap();

        assert_eq!(m.win_rate, dec!(50));
        assert_eq!(m.avg_multiplier, dec!(1.75));
        assert_eq!(m.risk_reward_ratio, dec!(1.5));
        assert_eq!(m.max_loss_streak, 1);
        assert_eq!(m.best_range, MultiplierBand::Medium);
        assert_eq!(m.emotional_bias_score, 50);
        // The 20 stake follows the 10 loss and is more than 1.5x it.
        assert_eq!(m.revenge_betting_score, 20);
        assert_eq!(m.total_profit_loss, dec!(5));
    }

    #[test]
    fn bigger_stake_after_a_loss_adds_twenty_points() {
        let mut rounds = vec![win(0, dec!(10), dec!(2)), loss(1, dec!(20))];
        let before = AnalyticsEngine::new().calculate(&rounds, &[]).unwrap();

        rounds.push(loss(2, dec!(35)));
        let after = AnalyticsEngine::new().calculate(&rounds, &[]).unwrap();

        assert_eq!(after.revenge_betting_score, before.revenge_betting_score + 20);
        assert_eq!(after.max_loss_streak, 2);
    }

    #[test]
    fn bigger_stake_after_a_win_adds_nothing() {
        let rounds = vec![loss(0, dec!(10)), win(1, dec!(20), dec!(1.75)), loss(2, dec!(35))];
        let m = AnalyticsEngine::new().calculate(&rounds, &[]).unwrap();

        assert_eq!(m.revenge_betting_score, 20);
        assert_eq!(m.max_loss_streak, 1);
    }

    #[test]
    fn very_large_stakes_still_produce_a_snapshot() {
        let whale = rust_decimal::Decimal::new(100_000_000_000_000, 0);
        let rounds = vec![win(0, whale, dec!(4)), loss(1, whale)];

        let snapshot = AnalyticsEngine::new().analyze(&rounds, &[], Utc::now()).unwrap();
        assert_eq!(snapshot.profit_consistency_score, dec!(50));
        assert_eq!(snapshot.win_rate, dec!(50));
    }

    #[test]
    fn analysis_is_idempotent_apart_from_the_timestamp() {
        let rounds = vec![
            win(0, dec!(10), dec!(1.4)),
            loss(1, dec!(10)),
            loss(2, dec!(25)),
            win(3, dec!(30), dec!(2.2)),
            win(4, dec!(10), dec!(3.5)),
        ];
        let entries = vec![entry(5, 7, 6, 30)];
        let engine = AnalyticsEngine::new();

        let first = engine.analyze(&rounds, &entries, Utc::now()).unwrap();
        let second = engine
            .analyze(&rounds, &entries, Utc::now() + Duration::seconds(30))
            .unwrap();

        assert_eq!(first.metrics(), second.metrics());
        assert_eq!(first.ai_comment, second.ai_comment);
        assert_eq!(first.performance_summary, second.performance_summary);
    }

    #[test]
    fn analyze_fills_in_commentary() {
        let rounds = vec![win(0, dec!(10), dec!(2)), win(1, dec!(10), dec!(2)), loss(2, dec!(5))];
        let snapshot = AnalyticsEngine::new().analyze(&rounds, &[], Utc::now()).unwrap();

        assert_eq!(snapshot.ai_comment, STABLE_COMMENT);
        assert_eq!(snapshot.ai_suggestion, DISCIPLINE_SUGGESTION);
        assert!(snapshot.performance_summary.contains("1.5-2.0x"));
    }

    #[test]
    fn out_of_order_input_is_rejected() {
        let rounds = vec![loss(5, dec!(10)), win(1, dec!(20), dec!(1.75))];
        let err = AnalyticsEngine::new().calculate(&rounds, &[]).unwrap_err();
        assert_eq!(err, AnalyticsError::UnsortedRounds { index: 1 });

        let entries = vec![entry(0, 5, 5, 5), entry(3, 5, 5, 5)];
        let err = AnalyticsEngine::new().calculate(&[], &entries).unwrap_err();
        assert_eq!(err, AnalyticsError::UnsortedMindsetEntries { index: 1 });
    }
}
