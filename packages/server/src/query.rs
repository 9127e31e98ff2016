//! Read-side aggregation: solution rows joined with their tag sets and
//! payloads. Collections come back empty, never absent.

use std::collections::HashMap;

use common::{BlobKey, BlobStore, ContentHash, SolutionData};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entity::{solution, solution_tag};
use crate::error::{AppError, Result};
use crate::models::Solution;
use crate::models::shared::validate_page_size;

/// Upper bound on bound parameters per `IN (..)` list.
const ID_BATCH: usize = 500;

pub async fn solution_by_id(
    db: &DatabaseConnection,
    blobs: &dyn BlobStore,
    solution_id: i64,
) -> Result<Solution> {
    let row = solution::Entity::find_by_id(solution_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Solution {solution_id}")))?;

    let mut tags = tags_by_solution(db, &[row.id]).await?;
    let row_tags = tags.remove(&row.id).unwrap_or_default();
    assemble(blobs, row, row_tags).await
}

pub async fn solutions_for_problem(
    db: &DatabaseConnection,
    blobs: &dyn BlobStore,
    problem_id: i64,
) -> Result<Vec<Solution>> {
    let rows = solution::Entity::find()
        .filter(solution::Column::ProblemId.eq(problem_id))
        .order_by_asc(solution::Column::Id)
        .all(db)
        .await?;
    hydrate(db, blobs, rows).await
}

pub async fn solutions_for_tag(
    db: &DatabaseConnection,
    blobs: &dyn BlobStore,
    tag: &str,
) -> Result<Vec<Solution>> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = solution_tag::Entity::find()
        .select_only()
        .column(solution_tag::Column::SolutionId)
        .filter(solution_tag::Column::Tag.eq(tag))
        .order_by_asc(solution_tag::Column::SolutionId)
        .into_tuple()
        .all(db)
        .await?;

    let mut rows = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(ID_BATCH) {
        rows.extend(
            solution::Entity::find()
                .filter(solution::Column::Id.is_in(chunk.to_vec()))
                .order_by_asc(solution::Column::Id)
                .all(db)
                .await?,
        );
    }
    hydrate(db, blobs, rows).await
}

/// Newest first: `created_at` descending, then ID descending. `page` is 0-based.
pub async fn recent_solutions(
    db: &DatabaseConnection,
    blobs: &dyn BlobStore,
    page_size: u64,
    page: u64,
) -> Result<Vec<Solution>> {
    validate_page_size(page_size)?;

    let rows = solution::Entity::find()
        .order_by_desc(solution::Column::CreatedAt)
        .order_by_desc(solution::Column::Id)
        .paginate(db, page_size)
        .fetch_page(page)
        .await?;
    hydrate(db, blobs, rows).await
}

/// Attach tags and payloads to rows, keeping their order.
async fn hydrate(
    db: &DatabaseConnection,
    blobs: &dyn BlobStore,
    rows: Vec<solution::Model>,
) -> Result<Vec<Solution>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut tags = tags_by_solution(db, &ids).await?;

    let mut solutions = Vec::with_capacity(rows.len());
    for row in rows {
        let row_tags = tags.remove(&row.id).unwrap_or_default();
        solutions.push(assemble(blobs, row, row_tags).await?);
    }
    Ok(solutions)
}

/// One tag query per batch of IDs. Each list comes back sorted.
async fn tags_by_solution(
    db: &DatabaseConnection,
    ids: &[i64],
) -> Result<HashMap<i64, Vec<String>>> {
    let mut tags: HashMap<i64, Vec<String>> = HashMap::new();
    for chunk in ids.chunks(ID_BATCH) {
        let rows = solution_tag::Entity::find()
            .filter(solution_tag::Column::SolutionId.is_in(chunk.to_vec()))
            .order_by_asc(solution_tag::Column::Tag)
            .all(db)
            .await?;
        for row in rows {
            tags.entry(row.solution_id).or_default().push(row.tag);
        }
    }
    Ok(tags)
}

async fn assemble(
    blobs: &dyn BlobStore,
    row: solution::Model,
    tags: Vec<String>,
) -> Result<Solution> {
    let content_hash = ContentHash::from_hex(&row.file_hash)?;
    let bytes = blobs.get(&BlobKey::Solution(content_hash)).await?;

    Ok(Solution {
        solution_id: row.id,
        problem_id: row.problem_id,
        created_at: row.created_at,
        content_hash,
        dislike: row.dislike,
        reject_reason: row.reject_reason,
        acquired_bonuses: serde_json::from_value(row.acquired_bonuses)?,
        tags,
        data: SolutionData::from_json(&bytes)?,
    })
}
