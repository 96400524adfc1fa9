use crate::error::EngineError;
use analytics::{AnalyticsEngine, AnalyticsSnapshot};
use chrono::Utc;
use configuration::AnalysisSettings;
use core_types::{MindsetEntry, Round};
use database::PerformanceStore;
use std::sync::Arc;

/// What a single recompute did.
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// A new snapshot was computed and replaced the stored one.
    Completed(AnalyticsSnapshot),
    /// The history is below the minimum sample size; nothing was written.
    InsufficientData { rounds: usize, required: usize },
    /// Reading the history or writing the snapshot failed. The previously stored
    /// snapshot, if any, is untouched.
    Failed(EngineError),
}

impl AnalysisOutcome {
    pub fn snapshot(&self) -> Option<&AnalyticsSnapshot> {
        match self {
            AnalysisOutcome::Completed(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Loads a user's history, recomputes their snapshot and persists it.
///
/// Each call is independent and recomputes from the full stored history, so
/// overlapping calls for the same user converge on whichever write lands last.
pub struct AnalysisOrchestrator {
    store: Arc<dyn PerformanceStore>,
    engine: AnalyticsEngine,
    min_rounds: usize,
}

impl AnalysisOrchestrator {
    pub fn new(store: Arc<dyn PerformanceStore>, settings: &AnalysisSettings) -> Self {
        Self {
            store,
            engine: AnalyticsEngine::new(),
            min_rounds: settings.min_rounds,
        }
    }

    pub fn min_rounds(&self) -> usize {
        self.min_rounds
    }

    /// Recomputes and stores the snapshot for `user_id`.
    ///
    /// Never returns an error: fetch and write failures are logged and reported
    /// through `AnalysisOutcome::Failed`.
    pub async fn analyze_user(&self, user_id: &str) -> AnalysisOutcome {
        // 1. Fetch
        let (rounds, mindset_entries) = match self.load_history(user_id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Could not load history; snapshot left as is.");
                return AnalysisOutcome::Failed(e);
            }
        };

        // 2. Guard
        if rounds.len() < self.min_rounds {
            tracing::info!(
                user_id,
                rounds = rounds.len(),
                required = self.min_rounds,
                "Not enough data to analyze."
            );
            return AnalysisOutcome::InsufficientData {
                rounds: rounds.len(),
                required: self.min_rounds,
            };
        }

        // 3. Compute
        let snapshot = match self.engine.analyze(&rounds, &mindset_entries, Utc::now()) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Analytics calculation failed.");
                return AnalysisOutcome::Failed(e.into());
            }
        };

        // 4. Store
        if let Err(e) = self.store.replace_snapshot(user_id, &snapshot).await {
            let e = EngineError::Write(e);
            tracing::error!(user_id, error = %e, "Could not persist snapshot; previous snapshot remains.");
            return AnalysisOutcome::Failed(e);
        }

        let win_rate = snapshot.win_rate.round_dp(2);
        tracing::info!(
            user_id,
            rounds = snapshot.total_rounds,
            %win_rate,
            best_range = %snapshot.best_range,
            "Snapshot updated."
        );
        AnalysisOutcome::Completed(snapshot)
    }

    /// Fetches rounds (oldest first) and journal entries (newest first).
    async fn load_history(&self, user_id: &str) -> Result<(Vec<Round>, Vec<MindsetEntry>), EngineError> {
        let (mut rounds, mut mindset_entries) = tokio::try_join!(
            self.store.fetch_rounds(user_id),
            self.store.fetch_mindset_entries(user_id)
        )
        .map_err(EngineError::Fetch)?;

        // Ids break timestamp ties so every recompute sees the same sequence.
        rounds.sort_by_key(|r| (r.timestamp, r.id));
        mindset_entries.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));

        tracing::debug!(
            user_id,
            rounds = rounds.len(),
            mindset_entries = mindset_entries.len(),
            "History loaded."
        );
        Ok((rounds, mindset_entries))
    }
}
