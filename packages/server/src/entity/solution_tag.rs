use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "solution_tag")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub solution_id: i64,
    #[sea_orm(primary_key)]
    pub tag: String,
    #[sea_orm(belongs_to, from = "solution_id", to = "id")]
    pub solution: HasOne<super::solution::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
