//! Rule-based coaching text.
//!
//! The comment is chosen by the first matching rule in a fixed priority order; the
//! suggestion is derived independently from the revenge betting score.

use crate::metrics::MultiplierBand;
use crate::snapshot::MetricsBundle;
use core_types::{Mindset, MindsetEntry, Round};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const HIGH_BIAS_THRESHOLD: u32 = 75;
pub const LOW_WIN_RATE_THRESHOLD: Decimal = dec!(40);
pub const UNFAVORABLE_RISK_REWARD: Decimal = dec!(1);
pub const REVENGE_SUGGESTION_THRESHOLD: u32 = 50;

pub const BIAS_COMMENT: &str = "High emotional bias detected. Focus on detaching from outcomes.";
pub const LOW_WIN_RATE_COMMENT: &str =
    "Win rate is low. Consider lowering your risk or reviewing your entry points.";
pub const RISK_REWARD_COMMENT: &str =
    "Your risk/reward is unfavorable. Aim for larger wins or smaller losses.";
pub const STABLE_COMMENT: &str = "Performance is stable. Continue executing your strategy with discipline.";

pub const BREAK_SUGGESTION: &str = "Take a 5-minute break after every 2 consecutive losses to reset.";
pub const DISCIPLINE_SUGGESTION: &str =
    "Your strategy is solid. Focus on maintaining discipline during drawdowns.";

pub const TILT_WARNING: &str = "Tilt Warning: You lose a significant majority of games when tilted. Take a break immediately after a loss when feeling tilted.";
pub const FOCUS_PAYS_OFF: &str = "Focus Pays Off: Your win rate is exceptionally high when you are focused. Identify what gets you in this state and replicate it.";
pub const DISCIPLINE_DIP: &str = "Discipline Dip: Your last session had a low discipline score. Let's focus on sticking to your predefined strategy today.";
pub const CONFIDENCE_CHECK: &str = "Confidence Check: Your confidence was low in the last session. Trust in your strategy and analysis, not momentary fear.";

/// All generated text for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Commentary {
    pub performance_summary: String,
    pub ai_suggestion: String,
    pub ai_comment: String,
    pub insights: Vec<String>,
}

impl Commentary {
    pub fn generate(metrics: &MetricsBundle, rounds: &[Round], mindset_entries: &[MindsetEntry]) -> Self {
        Self {
            performance_summary: performance_summary(
                metrics.best_range,
                metrics.revenge_betting_score,
                metrics.emotional_bias_score,
            ),
            ai_suggestion: ai_suggestion(metrics.revenge_betting_score).to_string(),
            ai_comment: ai_comment(metrics).to_string(),
            insights: behavioral_insights(rounds, mindset_entries),
        }
    }
}

/// Picks the coaching comment. First match wins.
pub fn ai_comment(metrics: &MetricsBundle) -> &'static str {
    if metrics.emotional_bias_score > HIGH_BIAS_THRESHOLD {
        BIAS_COMMENT
    } else if metrics.win_rate < LOW_WIN_RATE_THRESHOLD {
        LOW_WIN_RATE_COMMENT
    } else if metrics.risk_reward_ratio < UNFAVORABLE_RISK_REWARD {
        RISK_REWARD_COMMENT
    } else {
        STABLE_COMMENT
    }
}

pub fn ai_suggestion(revenge_betting_score: u32) -> &'static str {
    if revenge_betting_score > REVENGE_SUGGESTION_THRESHOLD {
        BREAK_SUGGESTION
    } else {
        DISCIPLINE_SUGGESTION
    }
}

pub fn performance_summary(best_range: MultiplierBand, revenge_betting_score: u32, emotional_bias_score: u32) -> String {
    format!(
        "You show consistency in the {best_range} range, but a {revenge_betting_score}% revenge betting score \
         and a {emotional_bias_score}% emotional bias suggest decisions are sometimes emotionally driven."
    )
}

/// Pattern notes from mindset-tagged rounds and the latest journal entry.
///
/// Notes are informational only and never feed back into any score.
pub fn behavioral_insights(rounds: &[Round], mindset_entries: &[MindsetEntry]) -> Vec<String> {
    let mut insights: Vec<&'static str> = Vec::new();

    let (tilted_total, tilted_losses) = tally(rounds, Mindset::Tilted, |r| r.outcome.is_loss());
    if tilted_losses > 2 && Decimal::from(tilted_losses) / Decimal::from(tilted_total) > dec!(0.6) {
        insights.push(TILT_WARNING);
    }

    let (focused_total, focused_wins) = tally(rounds, Mindset::Focused, |r| r.outcome.is_win());
    if focused_total > 3 && Decimal::from(focused_wins) / Decimal::from(focused_total) > dec!(0.7) {
        insights.push(FOCUS_PAYS_OFF);
    }

    if let Some(latest) = mindset_entries.first() {
        if latest.discipline_score < 5 {
            insights.push(DISCIPLINE_DIP);
        }
        if latest.confidence < 5 {
            insights.push(CONFIDENCE_CHECK);
        }
    }

    let mut unique: Vec<String> = Vec::with_capacity(insights.len());
    for note in insights {
        if !unique.iter().any(|n| n == note) {
            unique.push(note.to_string());
        }
    }
    unique
}

/// Returns (rounds tagged with `mindset`, of which matching `predicate`).
fn tally(rounds: &[Round], mindset: Mindset, predicate: impl Fn(&Round) -> bool) -> (usize, usize) {
    rounds
        .iter()
        .filter(|r| r.mindset == Some(mindset))
        .fold((0, 0), |(total, hits), r| (total + 1, hits + usize::from(predicate(r))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{entry, loss, win, with_mindset};

    fn metrics(bias: u32, win_rate: Decimal, risk_reward: Decimal) -> MetricsBundle {
        MetricsBundle {
            total_rounds: 10,
            win_rate,
            avg_multiplier: dec!(1.8),
            risk_reward_ratio: risk_reward,
            total_profit_loss: Decimal::ZERO,
            best_range: MultiplierBand::Medium,
            profit_consistency_score: dec!(60),
            max_loss_streak: 2,
            max_win_streak: 3,
            emotional_bias_score: bias,
            revenge_betting_score: 0,
        }
    }

    #[test]
    fn comment_rules_apply_in_priority_order() {
        // Everything is bad, bias wins.
        assert_eq!(ai_comment(&metrics(90, dec!(10), dec!(0.2))), BIAS_COMMENT);
        // Bias exactly at the threshold does not trigger.
        assert_eq!(ai_comment(&metrics(75, dec!(10), dec!(0.2))), LOW_WIN_RATE_COMMENT);
        assert_eq!(ai_comment(&metrics(20, dec!(55), dec!(0.9))), RISK_REWARD_COMMENT);
        assert_eq!(ai_comment(&metrics(20, dec!(40), dec!(1))), STABLE_COMMENT);
    }

    #[test]
    fn suggestion_depends_only_on_revenge_score() {
        assert_eq!(ai_suggestion(50), DISCIPLINE_SUGGESTION);
        assert_eq!(ai_suggestion(60), BREAK_SUGGESTION);
    }

    #[test]
    fn summary_interpolates_band_and_scores() {
        let summary = performance_summary(MultiplierBand::High, 40, 82);
        assert!(summary.starts_with("You show consistency in the 2.0-3.0x range"));
        assert!(summary.contains("a 40% revenge betting score"));
        assert!(summary.contains("a 82% emotional bias"));
    }

    #[test]
    fn tilted_losing_streaks_raise_a_warning() {
        let rounds: Vec<Round> = (0..4)
            .map(|m| with_mindset(loss(m, dec!(10)), Mindset::Tilted))
            .chain(std::iter::once(with_mindset(win(4, dec!(10), dec!(2)), Mindset::Tilted)))
            .collect();

        let insights = behavioral_insights(&rounds, &[]);
        assert_eq!(insights, vec![TILT_WARNING.to_string()]);
    }

    #[test]
    fn focused_winning_is_recognised() {
        let rounds: Vec<Round> = (0..4)
            .map(|m| with_mindset(win(m, dec!(10), dec!(1.5)), Mindset::Focused))
            .collect();

        assert_eq!(behavioral_insights(&rounds, &[]), vec![FOCUS_PAYS_OFF.to_string()]);
    }

    #[test]
    fn only_the_latest_journal_entry_is_consulted() {
        let entries = vec![entry(10, 3, 4, 20), entry(0, 9, 9, 20)];
        let insights = behavioral_insights(&[], &entries);
        assert_eq!(insights, vec![DISCIPLINE_DIP.to_string(), CONFIDENCE_CHECK.to_string()]);

        let entries = vec![entry(10, 9, 9, 20), entry(0, 1, 1, 20)];
        assert!(behavioral_insights(&[], &entries).is_empty());
    }
}
