use axum::{Router, routing::get};

use crate::state::AppState;

pub mod get;

/// Routes under `/api/students`.
pub fn student_routes() -> Router<AppState> {
    Router::new().route("/{student_id}/feedbacks", get(get::list_student_feedback))
}
