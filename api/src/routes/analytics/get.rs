use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::response::{ApiError, ApiResponse};
use crate::routes::common::{PageQuery, TrendQuery};
use crate::state::AppState;

/// GET /api/analytics/feedbacks/trends?group_by=day|month|year
///
/// Counts of visible feedback per period, oldest period first. Defaults to `month`.
pub async fn feedback_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .analytics()
        .trends(query.group_by.unwrap_or_default())
        .await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(report, "Feedback trends retrieved successfully")),
    ))
}

/// GET /api/analytics/feedbacks/ratings
///
/// ```json
/// [{ "rating": 5, "count": 12, "percentage": 40.0 }, ...]
/// ```
pub async fn rating_distribution(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.analytics().rating_distribution().await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(report, "Rating distribution retrieved successfully")),
    ))
}

/// GET /api/analytics/courses/top?page=&per_page=
pub async fn top_courses(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page) = query.normalize();
    let report = state.analytics().course_ranking(page, per_page).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(report, "Top courses retrieved successfully")),
    ))
}

/// GET /api/analytics/instructors/top?page=&per_page=
pub async fn top_instructors(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, per_page) = query.normalize();
    let report = state.analytics().instructor_ranking(page, per_page).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(report, "Top instructors retrieved successfully")),
    ))
}

pub async fn instructor_distribution(
    State(state): State<AppState>,
    Path(instructor_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.analytics().instructor_distribution(instructor_id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            report,
            "Instructor rating distribution retrieved successfully",
        )),
    ))
}

pub async fn course_summary(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let report = state.analytics().course_summary().await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(report, "Course summary retrieved successfully")),
    ))
}

/// GET /api/analytics/courses/rating/{days}
///
/// Mean course rating of feedback submitted in the last `days` days, today included.
pub async fn course_rating_since(
    State(state): State<AppState>,
    Path(days): Path<u32>,
) -> Result<impl IntoResponse, ApiError> {
    let average = state.analytics().recent_course_average(days).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(average, "Recent course rating retrieved successfully")),
    ))
}

/// GET /api/analytics/instructors/rating/{days}
pub async fn instructor_rating_since(
    State(state): State<AppState>,
    Path(days): Path<u32>,
) -> Result<impl IntoResponse, ApiError> {
    let average = state
        .analytics()
        .recent_instructor_average(days)
        .await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            average,
            "Recent instructor rating retrieved successfully",
        )),
    ))
}
