use common::{BlobKey, ContentHash, DISLIKE_SENTINEL, Evaluation};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use tracing::{debug, info};

use super::Catalog;
use crate::entity::{solution, solution_blob, solution_tag};
use crate::error::{AppError, Result, is_unique_violation};
use crate::models::shared::{normalize_tags, resolve_created_at, validate_tag};
use crate::models::{EvaluationTarget, NewSolution, Solution, SolutionAdded};
use crate::query;

impl Catalog {
    /// Store a solution, or return the existing one with identical content.
    ///
    /// The payload is canonicalized before hashing, so key order and
    /// whitespace of the input never create a second row. The row, its
    /// payload reference and its tags are written in one transaction.
    /// `(problem_id, file_hash)` is unique, so of two concurrent identical
    /// submissions one inserts and the other resolves to that row.
    pub async fn add_solution(&self, new: NewSolution) -> Result<SolutionAdded> {
        let problem = self.get_problem(new.problem_id).await?;
        new.data.validate(&problem.data)?;

        let (bytes, hash) = new.data.canonicalize()?;
        let file_hash = hash.to_hex();

        if let Some(existing) = self.find_identical(new.problem_id, &file_hash).await? {
            return Ok(existing);
        }

        let key = BlobKey::Solution(hash);
        if !self.blobs.exists(&key).await? {
            self.blobs.put(&key, &bytes).await?;
        }

        let created_at = resolve_created_at(new.created_at);
        let evaluation = new.evaluation.unwrap_or_else(Evaluation::unscored);
        let tags = normalize_tags(&new.tags);

        let txn = self.db.begin().await?;

        let blob_row = solution_blob::ActiveModel {
            content_hash: Set(file_hash.clone()),
            size: Set(bytes.len() as i64),
            created_at: Set(created_at),
        };
        let result = solution_blob::Entity::insert(blob_row)
            .on_conflict(
                OnConflict::column(solution_blob::Column::ContentHash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await;
        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        let row = solution::ActiveModel {
            problem_id: Set(new.problem_id),
            created_at: Set(created_at),
            file_hash: Set(file_hash.clone()),
            dislike: Set(evaluation.dislike),
            reject_reason: Set(evaluation.reject_reason),
            acquired_bonuses: Set(serde_json::to_value(&evaluation.acquired_bonuses)?),
            ..Default::default()
        };
        let solution_id = match solution::Entity::insert(row).exec(&txn).await {
            Ok(inserted) => inserted.last_insert_id,
            Err(e) if is_unique_violation(&e) => {
                // Lost the race to an identical submission; it has committed.
                txn.rollback().await?;
                return match self.find_identical(new.problem_id, &file_hash).await? {
                    Some(existing) => Ok(existing),
                    None => Err(e.into()),
                };
            }
            Err(e) => return Err(e.into()),
        };

        for tag in tags {
            let tag_row = solution_tag::ActiveModel {
                solution_id: Set(solution_id),
                tag: Set(tag),
            };
            solution_tag::Entity::insert(tag_row)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;

        info!(solution_id, problem_id = new.problem_id, "Added solution");

        Ok(SolutionAdded {
            solution_id,
            deduplicated: false,
        })
    }

    async fn find_identical(
        &self,
        problem_id: i64,
        file_hash: &str,
    ) -> Result<Option<SolutionAdded>> {
        let existing = solution::Entity::find()
            .select_only()
            .column(solution::Column::Id)
            .filter(solution::Column::ProblemId.eq(problem_id))
            .filter(solution::Column::FileHash.eq(file_hash))
            .order_by_asc(solution::Column::Id)
            .into_tuple::<i64>()
            .one(&self.db)
            .await?;

        Ok(existing.map(|solution_id| {
            debug!(solution_id, problem_id, "Identical solution already stored");
            SolutionAdded {
                solution_id,
                deduplicated: true,
            }
        }))
    }

    pub async fn get_solution(&self, solution_id: i64) -> Result<Solution> {
        query::solution_by_id(&self.db, self.blobs(), solution_id).await
    }

    pub async fn get_solutions_for_problem(&self, problem_id: i64) -> Result<Vec<Solution>> {
        query::solutions_for_problem(&self.db, self.blobs(), problem_id).await
    }

    pub async fn get_solutions_for_tag(&self, tag: &str) -> Result<Vec<Solution>> {
        query::solutions_for_tag(&self.db, self.blobs(), tag).await
    }

    pub async fn recent_solutions(&self, page_size: u64, page: u64) -> Result<Vec<Solution>> {
        query::recent_solutions(&self.db, self.blobs(), page_size, page).await
    }

    /// Adding a tag that is already present is a no-op.
    pub async fn add_solution_tag(&self, solution_id: i64, tag: &str) -> Result<()> {
        let tag = validate_tag(tag)?;
        self.ensure_solution(solution_id).await?;

        let model = solution_tag::ActiveModel {
            solution_id: Set(solution_id),
            tag: Set(tag),
        };
        let result = solution_tag::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    solution_tag::Column::SolutionId,
                    solution_tag::Column::Tag,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;

        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Removing an absent tag is a no-op.
    pub async fn remove_solution_tag(&self, solution_id: i64, tag: &str) -> Result<()> {
        let tag = validate_tag(tag)?;
        self.ensure_solution(solution_id).await?;

        solution_tag::Entity::delete_many()
            .filter(solution_tag::Column::SolutionId.eq(solution_id))
            .filter(solution_tag::Column::Tag.eq(tag))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Overwrite the scoring fields with a new verdict.
    pub async fn update_solution_eval_result(
        &self,
        solution_id: i64,
        evaluation: &Evaluation,
    ) -> Result<()> {
        let bonuses = serde_json::to_value(&evaluation.acquired_bonuses)?;

        let result = solution::Entity::update_many()
            .col_expr(solution::Column::Dislike, Expr::value(evaluation.dislike))
            .col_expr(
                solution::Column::RejectReason,
                Expr::value(evaluation.reject_reason.clone()),
            )
            .col_expr(solution::Column::AcquiredBonuses, Expr::value(bonuses))
            .filter(solution::Column::Id.eq(solution_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Solution {solution_id}")));
        }
        Ok(())
    }

    /// Solutions still waiting for a verdict, oldest ID first.
    pub async fn pending_evaluations(&self) -> Result<Vec<EvaluationTarget>> {
        let rows: Vec<(i64, i64, String)> = solution::Entity::find()
            .select_only()
            .column(solution::Column::Id)
            .column(solution::Column::ProblemId)
            .column(solution::Column::FileHash)
            .filter(solution::Column::Dislike.eq(DISLIKE_SENTINEL))
            .filter(solution::Column::RejectReason.eq(""))
            .order_by_asc(solution::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(into_target).collect())
    }

    /// Every solution, oldest ID first.
    pub async fn all_evaluation_targets(&self) -> Result<Vec<EvaluationTarget>> {
        let rows: Vec<(i64, i64, String)> = solution::Entity::find()
            .select_only()
            .column(solution::Column::Id)
            .column(solution::Column::ProblemId)
            .column(solution::Column::FileHash)
            .order_by_asc(solution::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(into_target).collect())
    }

    /// Raw canonical payload, as handed to the scorer.
    pub async fn read_solution_payload(&self, hash: &ContentHash) -> Result<Vec<u8>> {
        Ok(self.blobs.get(&BlobKey::Solution(*hash)).await?)
    }

    pub(super) async fn ensure_solution(&self, solution_id: i64) -> Result<()> {
        solution::Entity::find_by_id(solution_id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Solution {solution_id}")))
    }
}

fn into_target((solution_id, problem_id, file_hash): (i64, i64, String)) -> EvaluationTarget {
    EvaluationTarget {
        solution_id,
        problem_id,
        file_hash,
    }
}
