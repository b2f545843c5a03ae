use std::path::Path;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::error::AppResult;

const PRAGMAS: &[&str] = &["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"];

pub fn database_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

/// Opens the catalog file, creating it (and its directory) on first run.
pub async fn open(path: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let existed = path.exists();
    let db = connect_and_migrate(&database_url(path)).await?;

    if existed {
        info!(path = %path.display(), "database already exists");
    } else {
        info!(path = %path.display(), "database created");
    }
    Ok(db)
}

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    // One connection: catalog writes are single-writer, and `sqlite::memory:` must not fan out.
    let mut opts = ConnectOptions::new(database_url);
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts).await?;

    for pragma in PRAGMAS {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string())).await?;
    }

    Migrator::up(&db, None).await?;
    Ok(db)
}
