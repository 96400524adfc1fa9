mod common;

use analytics::MultiplierBand;
use common::{FlakyStore, entry_at, round_at};
use configuration::AnalysisSettings;
use database::{DbError, InMemoryStore, PerformanceStore};
use engine::{AnalysisOrchestrator, AnalysisOutcome, EngineError};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::Ordering;

fn settings(min_rounds: usize) -> AnalysisSettings {
    AnalysisSettings { min_rounds }
}

/// Inserts a five-round history in scrambled order.
async fn seed_history(store: &dyn PerformanceStore, user_id: &str) {
    let rounds = [
        round_at(4, dec!(10), dec!(2.5), dec!(3.1)), // win +15
        round_at(0, dec!(10), dec!(1.4), dec!(1.9)), // win +4
        round_at(2, dec!(25), dec!(0), dec!(1.2)),   // loss -25 after a loss of 10
        round_at(1, dec!(10), dec!(2.0), dec!(1.3)), // loss -10
        round_at(3, dec!(20), dec!(1.8), dec!(4.0)), // win +16
    ];
    for round in &rounds {
        store.insert_round(user_id, round).await.unwrap();
    }
}

#[tokio::test]
async fn full_history_is_sorted_analyzed_and_stored() {
    let store = Arc::new(InMemoryStore::new());
    seed_history(&*store, "alice").await;
    store.insert_mindset_entry("alice", &entry_at(-60, 90)).await.unwrap();
    store.insert_mindset_entry("alice", &entry_at(30, 35)).await.unwrap();

    let orchestrator = AnalysisOrchestrator::new(store.clone(), &settings(5));
    let outcome = orchestrator.analyze_user("alice").await;

    let snapshot = outcome.snapshot().expect("analysis should complete").clone();
    assert_eq!(snapshot.total_rounds, 5);
    assert_eq!(snapshot.win_rate, dec!(60));
    // Chronologically: win, loss(10), loss(25), win, win.
    assert_eq!(snapshot.max_loss_streak, 2);
    assert_eq!(snapshot.max_win_streak, 2);
    assert_eq!(snapshot.revenge_betting_score, 20);
    // Latest journal entry wins, not the first inserted.
    assert_eq!(snapshot.emotional_bias_score, 35);
    assert_eq!(snapshot.best_range, MultiplierBand::Medium);
    assert_eq!(snapshot.total_profit_loss, dec!(0));

    let stored = store.latest_snapshot("alice").await.unwrap().unwrap();
    assert_eq!(stored, snapshot);
}

#[tokio::test]
async fn too_few_rounds_is_a_silent_no_op() {
    let store = Arc::new(FlakyStore::new());
    for minute in 0..4 {
        store
            .insert_round("bob", &round_at(minute, dec!(5), dec!(1.5), dec!(2)))
            .await
            .unwrap();
    }

    let orchestrator = AnalysisOrchestrator::new(store.clone(), &settings(5));
    let outcome = orchestrator.analyze_user("bob").await;

    assert!(matches!(outcome, AnalysisOutcome::InsufficientData { rounds: 4, required: 5 }));
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    assert!(store.latest_snapshot("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn fetch_failure_is_reported_not_raised() {
    let store = Arc::new(FlakyStore::new());
    seed_history(&*store, "carol").await;
    store.fail_fetch(true);

    let orchestrator = AnalysisOrchestrator::new(store.clone(), &settings(5));
    let outcome = orchestrator.analyze_user("carol").await;

    assert!(matches!(
        outcome,
        AnalysisOutcome::Failed(EngineError::Fetch(DbError::ConnectionError(_)))
    ));
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn write_failure_leaves_the_previous_snapshot_in_place() {
    let store = Arc::new(FlakyStore::new());
    seed_history(&*store, "dave").await;
    let orchestrator = AnalysisOrchestrator::new(store.clone(), &settings(5));

    let first = orchestrator.analyze_user("dave").await;
    let previous = first.snapshot().unwrap().clone();

    store
        .insert_round("dave", &round_at(10, dec!(50), dec!(0), dec!(1.1)))
        .await
        .unwrap();
    store.fail_write(true);

    let second = orchestrator.analyze_user("dave").await;
    assert!(matches!(second, AnalysisOutcome::Failed(EngineError::Write(_))));

    let stored = store.latest_snapshot("dave").await.unwrap().unwrap();
    assert_eq!(stored, previous);
    assert_eq!(stored.total_rounds, 5);

    // The next trigger retries from the full history.
    store.fail_write(false);
    let third = orchestrator.analyze_user("dave").await;
    assert_eq!(third.snapshot().unwrap().total_rounds, 6);
}

#[tokio::test]
async fn recomputing_an_unchanged_history_is_idempotent() {
    let store = Arc::new(InMemoryStore::new());
    seed_history(&*store, "erin").await;
    store.insert_mindset_entry("erin", &entry_at(5, 80)).await.unwrap();
    let orchestrator = AnalysisOrchestrator::new(store.clone(), &settings(5));

    let first = orchestrator.analyze_user("erin").await;
    let second = orchestrator.analyze_user("erin").await;

    let (first, second) = (first.snapshot().unwrap(), second.snapshot().unwrap());
    assert_eq!(first.metrics(), second.metrics());
    assert_eq!(first.ai_comment, second.ai_comment);
    assert_eq!(first.ai_suggestion, second.ai_suggestion);
    assert_eq!(first.performance_summary, second.performance_summary);
    assert_eq!(first.insights, second.insights);
}

#[tokio::test]
async fn rounds_sharing_a_timestamp_are_ordered_the_same_way_every_time() {
    // Same instant: whether the 10 loss precedes the 20 stake decides the revenge score.
    let small = round_at(0, dec!(10), dec!(0), dec!(1.5));
    let big = round_at(0, dec!(20), dec!(0), dec!(1.5));

    let forward = Arc::new(InMemoryStore::new());
    forward.insert_round("gina", &small).await.unwrap();
    forward.insert_round("gina", &big).await.unwrap();

    let reversed = Arc::new(InMemoryStore::new());
    reversed.insert_round("gina", &big).await.unwrap();
    reversed.insert_round("gina", &small).await.unwrap();

    let a = AnalysisOrchestrator::new(forward, &settings(2)).analyze_user("gina").await;
    let b = AnalysisOrchestrator::new(reversed, &settings(2)).analyze_user("gina").await;

    let expected = if small.id < big.id { 20 } else { 0 };
    assert_eq!(a.snapshot().unwrap().metrics(), b.snapshot().unwrap().metrics());
    assert_eq!(a.snapshot().unwrap().revenge_betting_score, expected);
}

#[tokio::test]
async fn threshold_comes_from_settings() {
    let store = Arc::new(InMemoryStore::new());
    store
        .insert_round("frank", &round_at(0, dec!(10), dec!(1.2), dec!(1.5)))
        .await
        .unwrap();

    let orchestrator = AnalysisOrchestrator::new(store.clone(), &settings(1));
    assert_eq!(orchestrator.min_rounds(), 1);
    assert!(orchestrator.analyze_user("frank").await.snapshot().is_some());
}
