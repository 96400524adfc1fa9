use crate::orchestrator::{AnalysisOrchestrator, AnalysisOutcome};
use events::{AnalysisEvent, AnalysisFailure, AnalysisSkipped, RoundCreated, SnapshotNotice};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;

/// Whether any recompute is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Computing,
}

/// Runs the orchestrator for the user named in each `RoundCreated` event.
///
/// Invocations share no state beyond an in-flight counter; two rounds logged in
/// quick succession simply produce two full recomputes.
pub struct RecomputeTrigger {
    orchestrator: Arc<AnalysisOrchestrator>,
    in_flight: AtomicUsize,
    events: Option<broadcast::Sender<AnalysisEvent>>,
}

/// Decrements the in-flight counter when an invocation ends, however it ends.
struct Computing<'a>(&'a AtomicUsize);

impl<'a> Computing<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Computing<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RecomputeTrigger {
    pub fn new(orchestrator: Arc<AnalysisOrchestrator>) -> Self {
        Self {
            orchestrator,
            in_flight: AtomicUsize::new(0),
            events: None,
        }
    }

    /// Publishes an `AnalysisEvent` on `sender` after every invocation.
    pub fn with_events(mut self, sender: broadcast::Sender<AnalysisEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn state(&self) -> TriggerState {
        if self.in_flight.load(Ordering::SeqCst) == 0 {
            TriggerState::Idle
        } else {
            TriggerState::Computing
        }
    }

    /// Handles one "round created" event: Idle -> Computing -> Idle.
    pub async fn on_round_created(&self, event: &RoundCreated) -> AnalysisOutcome {
        tracing::info!(
            user_id = %event.user_id,
            round_id = %event.round_id,
            "New round created. Triggering analysis."
        );

        let outcome = {
            let _computing = Computing::enter(&self.in_flight);
            self.orchestrator.analyze_user(&event.user_id).await
        };

        self.publish(&event.user_id, &outcome);
        outcome
    }

    fn publish(&self, user_id: &str, outcome: &AnalysisOutcome) {
        let Some(sender) = &self.events else {
            return;
        };

        let event = match outcome {
            AnalysisOutcome::Completed(snapshot) => AnalysisEvent::SnapshotUpdated(SnapshotNotice {
                user_id: user_id.to_string(),
                performance_summary: snapshot.performance_summary.clone(),
                ai_comment: snapshot.ai_comment.clone(),
                ai_suggestion: snapshot.ai_suggestion.clone(),
                last_analyzed: snapshot.last_analyzed,
            }),
            AnalysisOutcome::InsufficientData { rounds, required } => AnalysisEvent::Skipped(AnalysisSkipped {
                user_id: user_id.to_string(),
                rounds: *rounds,
                required: *required,
            }),
            AnalysisOutcome::Failed(e) => AnalysisEvent::Failed(AnalysisFailure {
                user_id: user_id.to_string(),
                reason: e.to_string(),
            }),
        };

        if sender.send(event).is_err() {
            tracing::debug!(user_id, "No subscribers for analysis events.");
        }
    }
}

/// Consumes `RoundCreated` events until the channel closes, running each one on
/// its own task. Waits for in-flight recomputes before returning.
pub async fn run_trigger_service(trigger: Arc<RecomputeTrigger>, mut rounds_rx: mpsc::Receiver<RoundCreated>) {
    tracing::info!("Recompute trigger started.");
    let mut jobs = JoinSet::new();

    while let Some(event) = rounds_rx.recv().await {
        let trigger = Arc::clone(&trigger);
        jobs.spawn(async move {
            trigger.on_round_created(&event).await;
        });

        // Reap finished jobs so the set does not grow without bound.
        while let Some(result) = jobs.try_join_next() {
            if let Err(e) = result {
                tracing::error!(error = %e, "Recompute task panicked.");
            }
        }
    }

    while let Some(result) = jobs.join_next().await {
        if let Err(e) = result {
            tracing::error!(error = %e, "Recompute task panicked.");
        }
    }
    tracing::info!("Round channel closed. Recompute trigger stopped.");
}
