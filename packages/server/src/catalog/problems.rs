use common::{BlobKey, DISLIKE_SENTINEL, ProblemData};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::info;

use super::Catalog;
use crate::entity::problem;
use crate::error::{AppError, Result, is_unique_violation};
use crate::models::shared::resolve_created_at;
use crate::models::{NewProblem, Problem};

impl Catalog {
    /// Store a new problem document and its catalog row.
    ///
    /// The row is inserted first, inside a transaction that is committed
    /// only after the document is written. A caller that loses the race for
    /// an ID fails on the insert and never touches the stored document.
    pub async fn add_problem(&self, new: NewProblem) -> Result<Problem> {
        new.data.validate()?;
        let bytes = new.data.to_json()?;

        let created_at = resolve_created_at(new.created_at);
        let minimal_dislike = new.minimal_dislike.unwrap_or(DISLIKE_SENTINEL);

        let txn = self.db.begin().await?;

        let model = problem::ActiveModel {
            id: Set(new.problem_id),
            created_at: Set(created_at),
            minimal_dislike: Set(minimal_dislike),
        };
        if let Err(e) = problem::Entity::insert(model)
            .exec_without_returning(&txn)
            .await
        {
            txn.rollback().await?;
            if is_unique_violation(&e) {
                return Err(AppError::AlreadyExists(format!("Problem {}", new.problem_id)));
            }
            return Err(e.into());
        }

        self.blobs
            .put(&BlobKey::Problem(new.problem_id), &bytes)
            .await?;

        txn.commit().await?;

        info!(problem_id = new.problem_id, "Added problem");

        Ok(Problem {
            problem_id: new.problem_id,
            created_at,
            minimal_dislike,
            data: new.data,
        })
    }

    pub async fn get_problem(&self, problem_id: i64) -> Result<Problem> {
        let row = problem::Entity::find_by_id(problem_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Problem {problem_id}")))?;
        self.load_problem(row).await
    }

    pub async fn get_problems(&self) -> Result<Vec<Problem>> {
        let rows = problem::Entity::find()
            .order_by_asc(problem::Column::Id)
            .all(&self.db)
            .await?;

        let mut problems = Vec::with_capacity(rows.len());
        for row in rows {
            problems.push(self.load_problem(row).await?);
        }
        Ok(problems)
    }

    /// Overwrite the best known dislike for a problem.
    pub async fn update_minimal_dislike(&self, problem_id: i64, dislike: i64) -> Result<()> {
        let result = problem::Entity::update_many()
            .col_expr(problem::Column::MinimalDislike, Expr::value(dislike))
            .filter(problem::Column::Id.eq(problem_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Problem {problem_id}")));
        }
        Ok(())
    }

    /// Raw problem document, as handed to the scorer.
    pub async fn read_problem_payload(&self, problem_id: i64) -> Result<Vec<u8>> {
        Ok(self.blobs.get(&BlobKey::Problem(problem_id)).await?)
    }

    async fn load_problem(&self, row: problem::Model) -> Result<Problem> {
        let bytes = self.read_problem_payload(row.id).await?;
        Ok(Problem {
            problem_id: row.id,
            created_at: row.created_at,
            minimal_dislike: row.minimal_dislike,
            data: ProblemData::from_json(&bytes)?,
        })
    }
}
