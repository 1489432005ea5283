use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::error::AppResult;

const SQLITE_PRAGMAS: [&str; 3] =
    ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL", "PRAGMA cache_size=-64000"];

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    prepare(&db).await?;
    Ok(db)
}

/// Applies backend tuning and brings the schema up to date.
pub async fn prepare(db: &DatabaseConnection) -> AppResult<()> {
    let backend = db.get_database_backend();
    if backend == DatabaseBackend::Sqlite {
        for pragma in SQLITE_PRAGMAS {
            db.execute(Statement::from_string(backend, pragma.to_string())).await?;
        }
    }

    Migrator::up(db, None).await?;
    debug!(?backend, "database ready");
    Ok(())
}

pub fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
