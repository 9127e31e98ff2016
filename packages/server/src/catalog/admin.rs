use std::collections::HashMap;
use std::collections::hash_map::Entry;

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait};
use tracing::info;

use super::Catalog;
use crate::database;
use crate::entity::{problem, solution, solution_tag, submitted_solution};
use crate::error::Result;
use crate::models::DedupReport;

impl Catalog {
    /// Delete every solution that repeats an earlier row's payload for the
    /// same problem, keeping the lowest ID of each group.
    ///
    /// Submission records pointing at a deleted row are moved to the kept
    /// one. Each deletion is its own transaction. Once the table is clean
    /// the unique dedup index is (re)created.
    pub async fn dedup_solutions(&self) -> Result<DedupReport> {
        let problem_ids: Vec<i64> = problem::Entity::find()
            .select_only()
            .column(problem::Column::Id)
            .order_by_asc(problem::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut report = DedupReport::default();
        for problem_id in problem_ids {
            report.problems_scanned += 1;

            let rows: Vec<(i64, String)> = solution::Entity::find()
                .select_only()
                .column(solution::Column::Id)
                .column(solution::Column::FileHash)
                .filter(solution::Column::ProblemId.eq(problem_id))
                .order_by_asc(solution::Column::Id)
                .into_tuple()
                .all(&self.db)
                .await?;

            let mut first_by_hash: HashMap<String, i64> = HashMap::new();
            for (solution_id, file_hash) in rows {
                let keep_id = match first_by_hash.entry(file_hash) {
                    Entry::Vacant(slot) => {
                        slot.insert(solution_id);
                        continue;
                    }
                    Entry::Occupied(first) => *first.get(),
                };
                self.delete_duplicate(solution_id, keep_id).await?;
                report.solutions_deleted += 1;
                info!(solution_id, keep_id, problem_id, "Deleted duplicate solution");
            }
        }

        database::ensure_indexes(&self.db).await?;

        info!(
            problems = report.problems_scanned,
            deleted = report.solutions_deleted,
            "Dedup sweep finished"
        );
        Ok(report)
    }

    /// Delete tag rows whose text is empty. Returns the number removed.
    pub async fn remove_empty_tags(&self) -> Result<u64> {
        let result = solution_tag::Entity::delete_many()
            .filter(solution_tag::Column::Tag.eq(""))
            .exec(&self.db)
            .await?;

        info!(removed = result.rows_affected, "Removed empty tags");
        Ok(result.rows_affected)
    }

    async fn delete_duplicate(&self, solution_id: i64, keep_id: i64) -> Result<()> {
        let txn = self.db.begin().await?;

        solution_tag::Entity::delete_many()
            .filter(solution_tag::Column::SolutionId.eq(solution_id))
            .exec(&txn)
            .await?;

        submitted_solution::Entity::update_many()
            .col_expr(submitted_solution::Column::SolutionId, Expr::value(keep_id))
            .filter(submitted_solution::Column::SolutionId.eq(solution_id))
            .exec(&txn)
            .await?;

        solution::Entity::delete_by_id(solution_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}
