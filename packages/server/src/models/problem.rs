use common::ProblemData;
use serde::Serialize;

/// Input for [`Catalog::add_problem`](crate::catalog::Catalog::add_problem).
#[derive(Clone, Debug)]
pub struct NewProblem {
    pub problem_id: i64,
    pub data: ProblemData,
    /// Unix seconds; absent or zero means now.
    pub created_at: Option<i64>,
    /// Baseline dislike; absent means the sentinel.
    pub minimal_dislike: Option<i64>,
}

impl NewProblem {
    pub fn new(problem_id: i64, data: ProblemData) -> Self {
        Self {
            problem_id,
            data,
            created_at: None,
            minimal_dislike: None,
        }
    }

    pub fn created_at(mut self, created_at: i64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn minimal_dislike(mut self, dislike: i64) -> Self {
        self.minimal_dislike = Some(dislike);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub problem_id: i64,
    pub created_at: i64,
    pub minimal_dislike: i64,
    pub data: ProblemData,
}
