use common::{AcquiredBonus, ContentHash, Evaluation, ScoreState, SolutionData};
use serde::Serialize;

/// Input for [`Catalog::add_solution`](crate::catalog::Catalog::add_solution).
#[derive(Clone, Debug)]
pub struct NewSolution {
    pub problem_id: i64,
    pub data: SolutionData,
    pub tags: Vec<String>,
    /// Unix seconds; absent or zero means now.
    pub created_at: Option<i64>,
    /// Verdict the caller already has for this payload. Absent means the
    /// row starts Unscored and waits for the re-score loop.
    pub evaluation: Option<Evaluation>,
}

impl NewSolution {
    pub fn new(problem_id: i64, data: SolutionData) -> Self {
        Self {
            problem_id,
            data,
            tags: Vec::new(),
            created_at: None,
            evaluation: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn created_at(mut self, created_at: i64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_evaluation(mut self, evaluation: Evaluation) -> Self {
        self.evaluation = Some(evaluation);
        self
    }

    /// Whether a freshly inserted row would need the re-score loop.
    pub fn starts_unscored(&self) -> bool {
        self.evaluation
            .as_ref()
            .is_none_or(|e| e.state() == ScoreState::Unscored)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SolutionAdded {
    pub solution_id: i64,
    /// True when an identical payload was already stored for the problem
    /// and nothing was written.
    pub deduplicated: bool,
}

/// A solution row joined with its tags and payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub solution_id: i64,
    pub problem_id: i64,
    pub created_at: i64,
    pub content_hash: ContentHash,
    pub dislike: i64,
    pub reject_reason: String,
    pub acquired_bonuses: Vec<AcquiredBonus>,
    /// Sorted, without duplicates.
    pub tags: Vec<String>,
    pub data: SolutionData,
}

impl Solution {
    pub fn state(&self) -> ScoreState {
        ScoreState::of(self.dislike, &self.reject_reason)
    }
}

/// One unit of re-score work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationTarget {
    pub solution_id: i64,
    pub problem_id: i64,
    /// Hex digest as stored; parsed when the payload is read.
    pub file_hash: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    pub problems_scanned: u64,
    pub solutions_deleted: u64,
}
