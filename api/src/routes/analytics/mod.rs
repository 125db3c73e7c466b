//! Routes under `/api/analytics`.
//!
//! Reports are served from the shared report cache and recomputed after
//! any feedback mutation. The rolling averages are always read fresh.

use axum::{Router, routing::get};

use crate::state::AppState;

pub mod get;

use get::{
    course_rating_since, course_summary, feedback_trends, instructor_distribution,
    instructor_rating_since, rating_distribution, top_courses, top_instructors,
};

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/feedbacks/trends", get(feedback_trends))
        .route("/feedbacks/ratings", get(rating_distribution))
        .route("/courses/top", get(top_courses))
        .route("/courses/summary", get(course_summary))
        .route("/courses/rating/{days}", get(course_rating_since))
        .route("/instructors/top", get(top_instructors))
        .route(
            "/instructors/{instructor_id}/distribution",
            get(instructor_distribution),
        )
        .route("/instructors/rating/{days}", get(instructor_rating_since))
}
