use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog row for a problem. The document itself lives in the blob store
/// under `problems/<id>.json`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "problem")]
pub struct Model {
    /// Contest-assigned problem number.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    /// Unix seconds.
    pub created_at: i64,

    /// Best known dislike for this problem.
    pub minimal_dislike: i64,

    #[sea_orm(has_many)]
    pub solutions: HasMany<super::solution::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
