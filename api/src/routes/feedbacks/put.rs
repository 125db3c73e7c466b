use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use services::feedback_service::FeedbackRequest;

use crate::auth::CurrentActor;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

/// PUT /api/feedbacks/{feedback_id}
///
/// Replaces ratings and comments. The owning student cannot change; moving
/// to another course or instructor shifts the contribution between aggregates.
pub async fn edit_feedback(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(feedback_id): Path<i64>,
    Json(req): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let feedback = state.feedback().edit(&actor, feedback_id, req).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(feedback, "Feedback updated successfully")),
    ))
}

/// PUT /api/feedbacks/{feedback_id}/restore
pub async fn restore_feedback(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(feedback_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let feedback = state.feedback().restore(&actor, feedback_id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(feedback, "Feedback restored successfully")),
    ))
}
