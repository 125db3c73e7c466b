use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use services::feedback_service::{FeedbackRequest, Submitted};

use crate::auth::CurrentActor;
use crate::response::{ApiError, ApiResponse, rate_limit_headers};
use crate::state::AppState;

/// POST /api/feedbacks
///
/// Submits feedback for a course and its instructor. Students submit for
/// themselves; admins may submit on a student's behalf.
///
/// ### Request Body
/// ```json
/// {
///   "courseRating": 5,
///   "courseComment": "Clear lectures",
///   "instructorRating": 4,
///   "instructorComment": null,
///   "anonymous": false,
///   "studentId": 3,
///   "courseId": 1,
///   "instructorId": 2
/// }
/// ```
///
/// ### Responses
/// - `201 Created` with the stored feedback and `X-RateLimit-*` headers
/// - `400 Bad Request` (rating out of range, comment too long)
/// - `403 Forbidden` (not a student, not enrolled, or acting for someone else)
/// - `404 Not Found` (student, course or instructor missing)
/// - `429 Too Many Requests` (daily limit reached; headers show when it resets)
pub async fn submit_feedback(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Submitted { feedback, quota } = state.feedback().submit(&actor, req).await?;

    Ok((
        StatusCode::CREATED,
        rate_limit_headers(&quota),
        Json(ApiResponse::success(feedback, "Feedback submitted successfully")),
    ))
}
