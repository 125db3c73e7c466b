use std::convert::Infallible;
use std::sync::Arc;

use api::{routes::routes, state::AppState};
use axum::{Router, body::Body, http::Request, response::Response};
use db::test_utils::setup_test_db;
use services::quota::MemoryCounterStore;
use tower::ServiceExt;
use tower::util::BoxCloneService;

pub type TestApp = BoxCloneService<Request<Body>, Response, Infallible>;

/// Full `/api` router over a fresh in-memory database.
///
/// Quota counters live in memory so every test starts with a clean allowance.
pub async fn make_test_app() -> (TestApp, AppState) {
    let db = setup_test_db().await;
    let app_state = AppState::new(db, Arc::new(MemoryCounterStore::new()));

    let router = Router::new().nest("/api", routes(app_state.clone()));

    (router.into_service().boxed_clone(), app_state)
}
