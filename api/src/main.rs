use api::auth::middleware::log_request;
use api::routes::routes;
use api::state::AppState;
use axum::{Router, http::HeaderName, middleware::from_fn};
use services::quota::{CounterStore, DatabaseCounterStore, RedisCounterStore};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;
use tracing_appender::rolling;
use util::config;

#[tokio::main]
async fn main() {
    // Load configuration and initialize logging
    let _log_guard = init_logging(&config::log_file(), &config::log_level());

    let db = db::connect().await;
    let counters = counter_store(&db).await;
    let app_state = AppState::new(db, counters);

    let cors = CorsLayer::very_permissive().expose_headers([
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderName::from_static("x-ratelimit-reset"),
    ]);

    let app = Router::new()
        .nest("/api", routes(app_state))
        .layer(from_fn(log_request))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config::host(), config::port())
        .parse()
        .expect("Invalid address");

    println!(
        "Starting {} on http://{}:{}",
        config::project_name(),
        config::host(),
        config::port()
    );

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server crashed");
}

/// Redis when `REDIS_URL` is set, otherwise the `submission_quotas` table.
async fn counter_store(db: &sea_orm::DatabaseConnection) -> Arc<dyn CounterStore> {
    match config::redis_url() {
        Some(url) => {
            let store = RedisCounterStore::connect(&url)
                .await
                .expect("Failed to connect to Redis");
            tracing::info!("Daily quota counters stored in Redis");
            Arc::new(store)
        }
        None => {
            tracing::info!("Daily quota counters stored in the database");
            Arc::new(DatabaseCounterStore::new(db.clone()))
        }
    }
}

fn init_logging(log_file: &str, log_level: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(true);

    let env_filter = EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| EnvFilter::new("api=info,services=info,db=warn"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if config::log_to_stdout() {
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
