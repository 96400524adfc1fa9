//! Pure metric calculators.
//!
//! Every function here expects rounds sorted oldest first and mindset entries sorted
//! newest first. None of them allocate more than a handful of accumulators.

use crate::error::AnalyticsError;
use core_types::{MindsetEntry, Round};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returned by `risk_reward` when there are wins but no losses.
pub const RISK_REWARD_CAP: Decimal = dec!(100);

/// Score returned by calculators that have too little data to judge.
pub const NEUTRAL_SCORE: Decimal = dec!(50);

/// A loss followed by a stake larger than this multiple of the losing stake counts
/// as a revenge bet.
pub const REVENGE_STAKE_FACTOR: Decimal = dec!(1.5);

/// Points added per detected revenge bet.
pub const REVENGE_POINTS: u32 = 20;

/// Upper bound on the revenge betting score.
pub const REVENGE_CAP: u32 = 100;

/// Bias score used when the user has never journaled.
pub const NEUTRAL_BIAS: u32 = 50;

/// Percentage of winning rounds. `0` for an empty history.
pub fn win_rate(rounds: &[Round]) -> Decimal {
    if rounds.is_empty() {
        return Decimal::ZERO;
    }
    let wins = rounds.iter().filter(|r| r.outcome.is_win()).count();
    Decimal::from(wins) / Decimal::from(rounds.len()) * dec!(100)
}

/// Mean cash-out multiplier over winning rounds only.
pub fn avg_multiplier(rounds: &[Round]) -> Decimal {
    let (sum, count) = rounds
        .iter()
        .filter(|r| r.outcome.is_win())
        .fold((Decimal::ZERO, 0usize), |(sum, n), r| {
            (sum.saturating_add(r.cash_out_multiplier), n + 1)
        });

    if count == 0 {
        return Decimal::ZERO;
    }
    sum / Decimal::from(count)
}

/// Average winning profit divided by the magnitude of the average losing profit.
///
/// No losses with at least one win yields `RISK_REWARD_CAP`; no wins yields `0`.
pub fn risk_reward(rounds: &[Round]) -> Decimal {
    let mut win_total = Decimal::ZERO;
    let mut wins = 0usize;
    let mut loss_total = Decimal::ZERO;
    let mut losses = 0usize;

    for round in rounds {
        if round.outcome.is_win() {
            win_total = win_total.saturating_add(round.profit);
            wins += 1;
        } else {
            loss_total = loss_total.saturating_add(round.profit);
            losses += 1;
        }
    }

    if losses == 0 {
        return if wins > 0 { RISK_REWARD_CAP } else { Decimal::ZERO };
    }
    if wins == 0 {
        return Decimal::ZERO;
    }

    let avg_win = win_total / Decimal::from(wins);
    let avg_loss = (loss_total / Decimal::from(losses)).abs();
    if avg_loss.is_zero() {
        return RISK_REWARD_CAP;
    }
    avg_win.checked_div(avg_loss).unwrap_or(RISK_REWARD_CAP)
}

/// How tightly per-round profit clusters, relative to the average stake.
///
/// `clamp(100 - 50 * stddev(profit) / avg(stake), 0, 100)`, using the population
/// standard deviation. Fewer than two rounds, a zero average stake, or stakes too
/// large to square without overflow score a neutral 50.
pub fn profit_consistency(rounds: &[Round]) -> Decimal {
    if rounds.len() < 2 {
        return NEUTRAL_SCORE;
    }

    let Some(score) = consistency_score(rounds) else {
        tracing::warn!(rounds = rounds.len(), "Profit consistency overflowed; using the neutral score.");
        return NEUTRAL_SCORE;
    };
    score
}

/// `None` when an intermediate value leaves the `Decimal` range.
fn consistency_score(rounds: &[Round]) -> Option<Decimal> {
    let n = Decimal::from(rounds.len());
    let avg_stake = checked_total(rounds.iter().map(|r| r.amount))?.checked_div(n)?;
    if avg_stake <= Decimal::ZERO {
        return Some(NEUTRAL_SCORE);
    }

    let mean_profit = checked_total(rounds.iter().map(|r| r.profit))?.checked_div(n)?;
    let squared_deviations = rounds.iter().map(|r| {
        let deviation = r.profit.checked_sub(mean_profit)?;
        deviation.checked_mul(deviation)
    });
    let mut sum_of_squares = Decimal::ZERO;
    for square in squared_deviations {
        sum_of_squares = sum_of_squares.checked_add(square?)?;
    }
    let variance = sum_of_squares.checked_div(n)?;
    let std_dev = variance.sqrt()?;

    // A spread too wide to express relative to the stake is as inconsistent as it gets.
    let penalty = match std_dev.checked_div(avg_stake).and_then(|ratio| ratio.checked_mul(dec!(50))) {
        Some(penalty) => penalty,
        None => return Some(Decimal::ZERO),
    };
    Some((dec!(100) - penalty.min(dec!(100))).clamp(Decimal::ZERO, dec!(100)))
}

fn checked_total(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    values.fold(Some(Decimal::ZERO), |acc, v| acc?.checked_add(v))
}

/// Longest run of consecutive losses. A run still open at the end counts.
pub fn max_loss_streak(rounds: &[Round]) -> u32 {
    longest_run(rounds, |r| r.outcome.is_loss())
}

/// Longest run of consecutive wins.
pub fn max_win_streak(rounds: &[Round]) -> u32 {
    longest_run(rounds, |r| r.outcome.is_win())
}

fn longest_run(rounds: &[Round], matches: impl Fn(&Round) -> bool) -> u32 {
    let mut best = 0;
    let mut current = 0;
    for round in rounds {
        if matches(round) {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

/// Counts losses immediately followed by a stake more than 1.5x the losing stake.
///
/// Each detection adds 20 points, capped at 100. This is a counter, not a probability.
pub fn revenge_betting_score(rounds: &[Round]) -> u32 {
    let detections = rounds
        .windows(2)
        .filter(|pair| {
            // A losing stake too large to scale cannot be exceeded by the next one.
            pair[0].outcome.is_loss()
                && pair[0]
                    .amount
                    .checked_mul(REVENGE_STAKE_FACTOR)
                    .is_some_and(|threshold| pair[1].amount > threshold)
        })
        .count() as u32;

    detections.saturating_mul(REVENGE_POINTS).min(REVENGE_CAP)
}

/// The most recent self-reported emotional bias, or a neutral 50 without a journal.
///
/// `rounds` is accepted so that bias can later be weighted against recent play; it is
/// not consulted today.
pub fn emotional_correlation(_rounds: &[Round], mindset_entries: &[MindsetEntry]) -> u32 {
    mindset_entries
        .first()
        .map(|entry| u32::from(entry.emotional_bias_score))
        .unwrap_or(NEUTRAL_BIAS)
}

/// The fixed cash-out multiplier bands, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MultiplierBand {
    #[serde(rename = "1.1-1.5x")]
    Low,
    #[serde(rename = "1.5-2.0x")]
    Medium,
    #[serde(rename = "2.0-3.0x")]
    High,
    #[serde(rename = "3.0x+")]
    Moon,
}

impl MultiplierBand {
    pub const ALL: [MultiplierBand; 4] = [
        MultiplierBand::Low,
        MultiplierBand::Medium,
        MultiplierBand::High,
        MultiplierBand::Moon,
    ];

    /// The band a cash-out multiplier falls into. Upper bounds are inclusive and
    /// anything at or below 1.5x lands in the lowest band.
    pub fn for_multiplier(multiplier: Decimal) -> Self {
        if multiplier <= dec!(1.5) {
            MultiplierBand::Low
        } else if multiplier <= dec!(2.0) {
            MultiplierBand::Medium
        } else if multiplier <= dec!(3.0) {
            MultiplierBand::High
        } else {
            MultiplierBand::Moon
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MultiplierBand::Low => "1.1-1.5x",
            MultiplierBand::Medium => "1.5-2.0x",
            MultiplierBand::High => "2.0-3.0x",
            MultiplierBand::Moon => "3.0x+",
        }
    }
}

impl fmt::Display for MultiplierBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MultiplierBand {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MultiplierBand::ALL
            .into_iter()
            .find(|band| band.label() == s)
            .ok_or_else(|| AnalyticsError::UnknownBand(s.to_string()))
    }
}

/// The band whose winning rounds produced the highest summed profit.
///
/// Only a strictly greater sum displaces an earlier band, so ties (including a
/// history without wins) resolve to the first declared band.
pub fn best_range(rounds: &[Round]) -> MultiplierBand {
    let mut totals = [Decimal::ZERO; 4];
    for round in rounds.iter().filter(|r| r.outcome.is_win()) {
        let band = MultiplierBand::for_multiplier(round.cash_out_multiplier);
        totals[band as usize] = totals[band as usize].saturating_add(round.profit);
    }

    let mut best = MultiplierBand::Low;
    for band in MultiplierBand::ALL.into_iter().skip(1) {
        if totals[band as usize] > totals[best as usize] {
            best = band;
        }
    }
    best
}

/// Sum of signed profit over the whole history, saturating at the `Decimal` bounds.
pub fn total_profit_loss(rounds: &[Round]) -> Decimal {
    rounds.iter().fold(Decimal::ZERO, |total, r| total.saturating_add(r.profit))
}
