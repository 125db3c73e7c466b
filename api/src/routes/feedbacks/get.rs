use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::CurrentActor;
use crate::response::{ApiError, ApiResponse};
use crate::routes::common::PageQuery;
use crate::state::AppState;

/// GET /api/feedbacks/{feedback_id}
///
/// Soft-deleted records answer `404`.
pub async fn get_feedback(
    State(state): State<AppState>,
    Path(feedback_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let feedback = state.feedback().get(feedback_id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(feedback, "Feedback retrieved successfully")),
    ))
}

/// GET /api/feedbacks/quota
///
/// Today's submission allowance for the caller. Nothing is consumed.
pub async fn get_quota(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<impl IntoResponse, ApiError> {
    let quota = state.feedback().quota().peek(actor.id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(quota, "Quota retrieved successfully")),
    ))
}

/// GET /api/feedbacks/deleted?page=&per_page=
pub async fn list_deleted(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page) = query.normalize();
    let deleted = state.feedback().list_deleted(&actor, page, per_page).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(deleted, "Deleted feedback retrieved successfully")),
    ))
}
