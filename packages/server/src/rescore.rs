//! Background loop that (re-)evaluates stored solutions with the scorer.
//!
//! A sweep runs on every interval tick and whenever a [`RescoreHandle`]
//! asks for one. Wake-ups that arrive while a sweep is queued are merged
//! into it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::{ContentHash, ScoreState};
use evaluator::Evaluator;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::catalog::Catalog;
use crate::config::{RescoreConfig, RescoreMode};
use crate::models::EvaluationTarget;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    pub candidates: usize,
    pub scored: usize,
    pub rejected: usize,
    /// Items that could not be loaded or persisted; they stay as they were.
    pub failed: usize,
}

/// Cheap, cloneable trigger for an immediate sweep.
#[derive(Clone)]
pub struct RescoreHandle {
    wake_tx: mpsc::Sender<()>,
}

impl RescoreHandle {
    /// Request a sweep without waiting. Returns false when one is already
    /// pending (or the scheduler is gone), in which case the request is
    /// folded into it.
    pub fn wake(&self) -> bool {
        match self.wake_tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) | Err(TrySendError::Closed(())) => false,
        }
    }
}

pub struct RescoreScheduler {
    catalog: Catalog,
    evaluator: Arc<dyn Evaluator>,
    config: RescoreConfig,
    wake_rx: mpsc::Receiver<()>,
}

impl RescoreScheduler {
    pub fn new(
        catalog: Catalog,
        evaluator: Arc<dyn Evaluator>,
        config: RescoreConfig,
    ) -> (Self, RescoreHandle) {
        // One slot: a second wake before the first is consumed is dropped.
        let (wake_tx, wake_rx) = mpsc::channel(1);
        let scheduler = Self {
            catalog,
            evaluator,
            config,
            wake_rx,
        };
        (scheduler, RescoreHandle { wake_tx })
    }

    /// Sweep on every tick or wake-up until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        let period = Duration::from_secs(self.config.interval_secs.max(1));

        info!(
            interval_secs = period.as_secs(),
            mode = ?self.config.mode,
            "Starting re-score scheduler"
        );

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(()) = self.wake_rx.recv() => debug!("Sweep requested"),
                _ = interval.tick() => {}
            }

            match self.sweep(&cancel).await {
                Ok(stats) if stats.candidates > 0 => info!(
                    candidates = stats.candidates,
                    scored = stats.scored,
                    rejected = stats.rejected,
                    failed = stats.failed,
                    "Sweep finished"
                ),
                Ok(_) => {}
                Err(e) => error!(error = %e, "Sweep failed"),
            }
        }

        info!("Re-score scheduler stopped");
    }

    /// Evaluate every candidate once. A failing item is logged and skipped.
    /// Cancellation abandons the item in flight, which stays as it was.
    pub async fn sweep(&self, cancel: &CancellationToken) -> anyhow::Result<SweepStats> {
        let targets = match self.config.mode {
            RescoreMode::Pending => self.catalog.pending_evaluations().await,
            RescoreMode::All => self.catalog.all_evaluation_targets().await,
        }
        .context("Failed to list re-score candidates")?;

        let mut stats = SweepStats {
            candidates: targets.len(),
            ..Default::default()
        };

        for (done, target) in targets.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(remaining = targets.len() - done, "Sweep cancelled");
                break;
            }

            match self.rescore(target, cancel).await {
                Ok(Some(ScoreState::Rejected)) => stats.rejected += 1,
                Ok(Some(_)) => stats.scored += 1,
                Ok(None) => {
                    info!(
                        solution_id = target.solution_id,
                        remaining = targets.len() - done,
                        "Sweep cancelled during evaluation"
                    );
                    break;
                }
                Err(e) => {
                    stats.failed += 1;
                    error!(
                        solution_id = target.solution_id,
                        problem_id = target.problem_id,
                        error = %e,
                        "Failed to re-score solution"
                    );
                }
            }
        }

        Ok(stats)
    }

    /// `None` when `cancel` fired before the evaluator answered.
    async fn rescore(
        &self,
        target: &EvaluationTarget,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Option<ScoreState>> {
        let problem = self
            .catalog
            .read_problem_payload(target.problem_id)
            .await
            .context("Failed to read problem")?;
        let hash = ContentHash::from_hex(&target.file_hash)?;
        let solution = self
            .catalog
            .read_solution_payload(&hash)
            .await
            .context("Failed to read solution")?;

        let evaluation = tokio::select! {
            _ = cancel.cancelled() => return Ok(None),
            evaluation = self.evaluator.evaluate(&problem, &solution) => evaluation,
        };
        self.catalog
            .update_solution_eval_result(target.solution_id, &evaluation)
            .await
            .context("Failed to store evaluation")?;

        debug!(
            solution_id = target.solution_id,
            state = %evaluation.state(),
            dislike = evaluation.dislike,
            "Re-scored solution"
        );
        Ok(Some(evaluation.state()))
    }
}
