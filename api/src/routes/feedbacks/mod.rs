//! Routes under `/api/feedbacks`.
//!
//! - `POST   /`                      → submit
//! - `GET    /quota`                 → today's usage for the caller
//! - `GET    /deleted`               → soft-deleted records (admin)
//! - `GET    /{feedback_id}`         → one visible record
//! - `PUT    /{feedback_id}`         → edit ratings and comments
//! - `DELETE /{feedback_id}`         → soft delete
//! - `PUT    /{feedback_id}/restore` → undo a soft delete
//! - `DELETE /{feedback_id}/permanent` → purge

use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post, put},
};

use crate::auth::guards::allow_admin;
use crate::state::AppState;

pub mod delete;
pub mod get;
pub mod post;
pub mod put;

use delete::{purge_feedback, soft_delete_feedback};
use get::{get_feedback, get_quota, list_deleted};
use post::submit_feedback;
use put::{edit_feedback, restore_feedback};

pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_feedback))
        .route("/quota", get(get_quota))
        .route(
            "/deleted",
            get(list_deleted).route_layer(from_fn(allow_admin)),
        )
        .route(
            "/{feedback_id}",
            get(get_feedback)
                .put(edit_feedback)
                .delete(soft_delete_feedback),
        )
        .route("/{feedback_id}/restore", put(restore_feedback))
        .route("/{feedback_id}/permanent", delete(purge_feedback))
}
