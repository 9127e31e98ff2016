use std::sync::Arc;

use common::Evaluation;
use evaluator::Evaluator;
use tracing::debug;

use crate::catalog::Catalog;
use crate::config::RescoreConfig;
use crate::error::Result;
use crate::models::{NewSolution, SolutionAdded};
use crate::rescore::RescoreHandle;

/// What an outer API layer holds on to.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub evaluator: Arc<dyn Evaluator>,
    pub rescore: RescoreHandle,
    pub score_on_submit: bool,
}

impl AppState {
    pub fn new(
        catalog: Catalog,
        evaluator: Arc<dyn Evaluator>,
        rescore: RescoreHandle,
        config: &RescoreConfig,
    ) -> Self {
        Self {
            catalog,
            evaluator,
            rescore,
            score_on_submit: config.score_on_submit,
        }
    }

    /// Add a solution and, if it created a row that still needs a verdict,
    /// ask the scheduler for a sweep.
    ///
    /// With `score_on_submit`, a submission that carries no verdict is
    /// evaluated first and stored with the result.
    pub async fn submit_solution(&self, mut new: NewSolution) -> Result<SolutionAdded> {
        if self.score_on_submit && new.evaluation.is_none() {
            new.evaluation = Some(self.evaluate(&new).await?);
        }

        let needs_score = new.starts_unscored();
        let added = self.catalog.add_solution(new).await?;

        if needs_score && !added.deduplicated {
            let queued = self.rescore.wake();
            debug!(solution_id = added.solution_id, queued, "Requested re-score sweep");
        }
        Ok(added)
    }

    /// Score the canonical payload against the stored problem document.
    async fn evaluate(&self, new: &NewSolution) -> Result<Evaluation> {
        let problem = self.catalog.get_problem(new.problem_id).await?;
        new.data.validate(&problem.data)?;

        let problem_bytes = problem.data.to_json()?;
        let (solution_bytes, _) = new.data.canonicalize()?;
        let evaluation = self
            .evaluator
            .evaluate(&problem_bytes, &solution_bytes)
            .await;

        debug!(
            problem_id = new.problem_id,
            state = %evaluation.state(),
            "Scored submission"
        );
        Ok(evaluation)
    }
}
