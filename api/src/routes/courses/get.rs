use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::response::{ApiError, ApiResponse};
use crate::routes::common::{DEFAULT_RECENT_DAYS, FeedbackListQuery, RecentQuery};
use crate::state::AppState;

/// GET /api/courses/{course_id}/feedbacks
///
/// ### Query Parameters
/// - `page`, `per_page` (default 1 and 20, at most 100 per page)
/// - `sort`: `submitted_at` (default), `course_rating`, `instructor_rating`
/// - `order`: `asc` or `desc` (default)
/// - `min_rating`, `max_rating`: inclusive bounds on the course rating
/// - `anonymous`: `true` or `false`
///
/// Anonymous entries are listed with the student name `Anonymous`.
pub async fn list_course_feedback(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    Query(query): Query<FeedbackListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page) = query.normalize();
    let listing = state
        .feedback()
        .list_for_course(course_id, &query.filter(), page, per_page)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(listing, "Course feedback retrieved successfully")),
    ))
}

/// GET /api/courses/{course_id}/feedbacks/recent?days=7
pub async fn recent_course_feedback(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    Query(query): Query<RecentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_RECENT_DAYS);
    let recent = state.feedback().recent_for_course(course_id, days).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(recent, "Recent course feedback retrieved successfully")),
    ))
}
