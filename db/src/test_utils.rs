use std::path::Path;
use std::time::Duration;

use migration::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

/// In-memory database with every migration applied.
///
/// The pool is pinned to a single connection: each new SQLite memory
/// connection would otherwise open an empty database of its own.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// File-backed database under `dir` with a multi-connection pool, for tests
/// where transactions have to overlap.
pub async fn setup_file_db(dir: &Path) -> DatabaseConnection {
    let url = format!("sqlite://{}?mode=rwc", dir.join("test.db").display());
    let mut opts = ConnectOptions::new(url);
    opts.max_connections(10).sqlx_logging(false);
    opts.map_sqlx_sqlite_opts(|o| o.busy_timeout(Duration::from_secs(5)));

    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to file db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}
