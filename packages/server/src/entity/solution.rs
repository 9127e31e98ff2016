use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "solution")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub problem_id: i64,
    #[sea_orm(belongs_to, from = "problem_id", to = "id")]
    pub problem: HasOne<super::problem::Entity>,

    /// Unix seconds.
    pub created_at: i64,

    /// Hex SHA-256 of the canonical payload.
    pub file_hash: String,
    #[sea_orm(belongs_to, from = "file_hash", to = "content_hash")]
    pub blob: HasOne<super::solution_blob::Entity>,

    /// `999_999_999` until a valid score is recorded.
    pub dislike: i64,

    /// Empty unless the solution was rejected.
    pub reject_reason: String,

    /// Bonuses reported by the scorer, as a JSON array of {bonus, problem}.
    #[sea_orm(column_type = "Json")]
    pub acquired_bonuses: serde_json::Value,

    #[sea_orm(has_many)]
    pub tags: HasMany<super::solution_tag::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
