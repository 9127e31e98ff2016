use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::entity::{solution, solution_tag};

pub async fn init_db(db_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;
    ensure_indexes(&db).await?;

    Ok(db)
}

/// Ensure the lookup indexes exist.
///
/// `idx_solution_problem_hash` is unique and backs solution dedup. Creating
/// it fails on a database that already holds duplicate rows; that is logged
/// and the index is retried after `dedup_solutions` has cleaned them up.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();

    // SELECT .. FROM solution WHERE problem_id = ? AND file_hash = ?
    let problem_hash = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_solution_problem_hash")
        .table(solution::Entity)
        .col(solution::Column::ProblemId)
        .col(solution::Column::FileHash)
        .to_owned();

    // SELECT solution_id FROM solution_tag WHERE tag = ?
    let tag = Index::create()
        .if_not_exists()
        .name("idx_solution_tag_tag")
        .table(solution_tag::Entity)
        .col(solution_tag::Column::Tag)
        .to_owned();

    for (name, stmt) in [
        ("idx_solution_problem_hash", problem_hash),
        ("idx_solution_tag_tag", tag),
    ] {
        match db.execute_raw(backend.build(&stmt)).await {
            Ok(_) => info!("Ensured index {name} exists"),
            Err(e) => warn!("Failed to create index {name}: {e}"),
        }
    }

    Ok(())
}
