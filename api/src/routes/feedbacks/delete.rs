use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::CurrentActor;
use crate::auth::guards::Empty;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

/// DELETE /api/feedbacks/{feedback_id}
///
/// Hides the record and removes its ratings from both aggregates. The
/// response carries the record as it now stands, with `deletedAt` set.
pub async fn soft_delete_feedback(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(feedback_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let feedback = state.feedback().soft_delete(&actor, feedback_id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(feedback, "Feedback deleted successfully")),
    ))
}

/// DELETE /api/feedbacks/{feedback_id}/permanent
///
/// Removes the row for good. Works on both visible and soft-deleted records.
pub async fn purge_feedback(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(feedback_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.feedback().purge(&actor, feedback_id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::<Empty>::success(Empty, "Feedback permanently deleted")),
    ))
}
