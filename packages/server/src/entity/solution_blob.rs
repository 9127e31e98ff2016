use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "solution_blob")]
pub struct Model {
    /// SHA-256 content hash.
    #[sea_orm(primary_key, auto_increment = false)]
    pub content_hash: String,

    /// Size of the canonical payload in bytes.
    pub size: i64,

    pub created_at: i64,

    #[sea_orm(has_many)]
    pub solutions: HasMany<super::solution::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
