use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Links an ID issued by the contest server to the solution it refers to,
/// so the same external submission is never imported twice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedSolution {
    pub submitted_solution_id: String,
    pub problem_id: i64,
    pub solution_id: i64,
    /// Unix seconds.
    pub created_at: i64,
}

impl SubmittedSolution {
    /// All four fields are mandatory.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.submitted_solution_id.trim().is_empty() {
            return Err(AppError::Validation(
                "Submitted solution ID must not be empty".into(),
            ));
        }
        if self.problem_id == 0 {
            return Err(AppError::Validation("Problem ID must be set".into()));
        }
        if self.solution_id == 0 {
            return Err(AppError::Validation("Solution ID must be set".into()));
        }
        if self.created_at == 0 {
            return Err(AppError::Validation("Creation time must be set".into()));
        }
        Ok(())
    }
}

/// A dispatched solver job, recorded for observability only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningTask {
    pub task_id: i64,
    pub problem_id: i64,
    /// Unix seconds.
    pub created_at: i64,
}
