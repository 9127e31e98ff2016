use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A solution that was sent to the contest server, keyed by the ID the
/// contest server handed back.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submitted_solution")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub submitted_solution_id: String,

    pub problem_id: i64,
    pub solution_id: i64,
    pub created_at: i64,
}

impl ActiveModelBehavior for ActiveModel {}
