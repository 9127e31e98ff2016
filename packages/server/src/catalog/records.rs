use sea_orm::{ActiveValue::Set, EntityTrait, QueryOrder};
use tracing::info;

use super::Catalog;
use crate::entity::{running_task, submitted_solution};
use crate::error::{AppError, Result};
use crate::models::shared::now_unix;
use crate::models::{RunningTask, SubmittedSolution};

impl Catalog {
    /// Record a submission to the contest server. The external ID is unique.
    pub async fn add_submitted_solution(&self, record: SubmittedSolution) -> Result<()> {
        record.validate()?;

        if submitted_solution::Entity::find_by_id(record.submitted_solution_id.clone())
            .one(&self.db)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(format!(
                "Submitted solution {}",
                record.submitted_solution_id
            )));
        }

        let model = submitted_solution::ActiveModel {
            submitted_solution_id: Set(record.submitted_solution_id.clone()),
            problem_id: Set(record.problem_id),
            solution_id: Set(record.solution_id),
            created_at: Set(record.created_at),
        };
        submitted_solution::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await?;

        info!(
            submitted_solution_id = %record.submitted_solution_id,
            problem_id = record.problem_id,
            solution_id = record.solution_id,
            "Recorded submitted solution"
        );
        Ok(())
    }

    pub async fn get_submitted_solutions(&self) -> Result<Vec<SubmittedSolution>> {
        let rows = submitted_solution::Entity::find()
            .order_by_asc(submitted_solution::Column::CreatedAt)
            .order_by_asc(submitted_solution::Column::SubmittedSolutionId)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| SubmittedSolution {
                submitted_solution_id: row.submitted_solution_id,
                problem_id: row.problem_id,
                solution_id: row.solution_id,
                created_at: row.created_at,
            })
            .collect())
    }

    /// Record a dispatched solver job, stamped with the current time.
    pub async fn add_running_task(&self, task_id: i64, problem_id: i64) -> Result<RunningTask> {
        if running_task::Entity::find_by_id(task_id)
            .one(&self.db)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(format!("Running task {task_id}")));
        }

        let created_at = now_unix();
        let model = running_task::ActiveModel {
            task_id: Set(task_id),
            problem_id: Set(problem_id),
            created_at: Set(created_at),
        };
        running_task::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await?;

        Ok(RunningTask {
            task_id,
            problem_id,
            created_at,
        })
    }

    pub async fn get_running_tasks(&self) -> Result<Vec<RunningTask>> {
        let rows = running_task::Entity::find()
            .order_by_asc(running_task::Column::TaskId)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| RunningTask {
                task_id: row.task_id,
                problem_id: row.problem_id,
                created_at: row.created_at,
            })
            .collect())
    }
}
