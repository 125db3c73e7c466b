pub mod aggregate;
pub mod models;
pub mod reports;
pub mod test_utils;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use util::config;

pub async fn connect() -> DatabaseConnection {
    let path_or_url = config::database_path();
    // Already a DSN? Use it as-is; otherwise treat it as a SQLite file path.
    let url = if path_or_url.starts_with("sqlite:") {
        path_or_url
    } else {
        // SQLite won't create intermediate dirs.
        if let Some(parent) = Path::new(&path_or_url).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        format!("sqlite://{path_or_url}?mode=rwc")
    };

    let busy_timeout = Duration::from_millis(config::database_busy_timeout_ms());
    let mut opts = ConnectOptions::new(url.clone());
    opts.max_connections(config::database_max_connections())
        .sqlx_logging(false);
    opts.map_sqlx_sqlite_opts(move |o| o.busy_timeout(busy_timeout));

    tracing::info!(url = %url, "Connecting to database");
    Database::connect(opts)
        .await
        .expect("Failed to connect to database")
}
