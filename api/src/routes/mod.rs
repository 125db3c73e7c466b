//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → Health check endpoint (public)
//! - `/feedbacks` → Submission and lifecycle of individual feedback records
//! - `/courses` → Per-course feedback listings
//! - `/students` → Per-student feedback history
//! - `/analytics` → Cached reports and rolling averages
//!
//! Everything except `/health` requires a bearer token.

use crate::auth::guards::allow_authenticated;
use crate::response::render_errors;
use crate::routes::{
    analytics::analytics_routes, courses::course_routes, feedbacks::feedback_routes,
    health::health_routes, students::student_routes,
};
use crate::state::AppState;
use axum::{Router, middleware::from_fn};

pub mod analytics;
pub mod common;
pub mod courses;
pub mod feedbacks;
pub mod health;
pub mod students;

/// Builds the complete `/api` router with its state applied.
///
/// Errors raised by handlers are rendered into the JSON envelope by
/// [`render_errors`], which wraps every group.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest(
            "/feedbacks",
            feedback_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/courses",
            course_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/students",
            student_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/analytics",
            analytics_routes().route_layer(from_fn(allow_authenticated)),
        )
        .layer(from_fn(render_errors))
        .with_state(app_state)
}
