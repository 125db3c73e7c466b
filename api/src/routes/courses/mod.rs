use axum::{Router, routing::get};

use crate::state::AppState;

pub mod get;

use get::{list_course_feedback, recent_course_feedback};

/// Routes under `/api/courses`.
pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/{course_id}/feedbacks", get(list_course_feedback))
        .route("/{course_id}/feedbacks/recent", get(recent_course_feedback))
}
