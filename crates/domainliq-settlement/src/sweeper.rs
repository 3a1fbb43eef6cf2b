//! Periodic sweep releasing funds whose protection window has elapsed.
//!
//! The sweeper is a thin driver: it snapshots the due list, then pushes
//! each order through [`SettlementEngine::auto_release`]. All race safety
//! lives in the store's conditional update, so a buyer confirming in the
//! same instant costs the sweeper nothing but a lost race to count.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;

use crate::engine::SettlementEngine;
use crate::store::AutoReleaseOutcome;

/// Counters from one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Orders this sweep released.
    pub released: usize,
    /// Orders another trigger completed between snapshot and release.
    pub lost_races: usize,
    /// Orders whose deadline moved into the future after the snapshot.
    pub skipped: usize,
    /// Orders whose release attempt failed; retried next sweep if still due.
    pub errors: usize,
}

/// Background task driving automatic release.
pub struct ReleaseSweeper {
    engine: Arc<SettlementEngine>,
    interval: Duration,
}

impl ReleaseSweeper {
    #[must_use]
    pub fn new(engine: Arc<SettlementEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Sweep on the configured interval until the task is dropped.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(interval = ?self.interval, "Release sweeper started");
        loop {
            ticker.tick().await;
            let summary = self.sweep_once(Utc::now()).await;
            if summary == SweepSummary::default() {
                tracing::debug!("Sweep found nothing due");
            } else {
                tracing::info!(
                    released = summary.released,
                    lost_races = summary.lost_races,
                    errors = summary.errors,
                    "Sweep finished"
                );
            }
        }
    }

    /// One sweep pass over everything due at `now`.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> SweepSummary {
        let mut summary = SweepSummary::default();
        for id in self.engine.due_for_release(now) {
            match self.engine.auto_release(id, now).await {
                Ok(AutoReleaseOutcome::Completed(_)) => summary.released += 1,
                Ok(AutoReleaseOutcome::AlreadyCompleted { .. }) => summary.lost_races += 1,
                Ok(AutoReleaseOutcome::NotYetEligible { .. }) => summary.skipped += 1,
                Err(err) => {
                    tracing::warn!(order = %id, error = %err, "Automatic release failed");
                    summary.errors += 1;
                }
            }
        }
        summary
    }
}
