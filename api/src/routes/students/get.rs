use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::response::{ApiError, ApiResponse};
use crate::routes::common::PageQuery;
use crate::state::AppState;

/// GET /api/students/{student_id}/feedbacks?page=&per_page=
///
/// Visible feedback written by one student, newest first.
pub async fn list_student_feedback(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page) = query.normalize();
    let listing = state
        .feedback()
        .list_for_student(student_id, page, per_page)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(listing, "Student feedback retrieved successfully")),
    ))
}
