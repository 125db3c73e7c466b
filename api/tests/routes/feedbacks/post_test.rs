#[cfg(test)]
mod tests {
    use crate::helpers::{body_json, feedback_body, make_test_app, request, setup_test_data};
    use api::auth::generate_jwt;
    use axum::http::StatusCode;
    use db::models::{course::Model as CourseModel, instructor::Model as InstructorModel};
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn submit_feedback_success() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);

        let req = request(
            "POST",
            "/api/feedbacks",
            Some(&token),
            Some(feedback_body(&data, data.student.id, 5)),
        );
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-ratelimit-limit"], "10");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "9");
        assert!(response.headers().contains_key("x-ratelimit-reset"));

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Feedback submitted successfully");
        assert_eq!(json["data"]["courseRating"], 5);
        assert_eq!(json["data"]["studentName"], "Sam Student");
        assert_eq!(json["data"]["courseName"], "Data Structures");
        assert_eq!(json["data"]["instructorName"], "Dr. Nkosi");
        assert_eq!(json["data"]["deletedAt"], "Not yet deleted");

        let course = CourseModel::find(app_state.db(), data.course.id).await.unwrap().unwrap();
        assert_eq!(course.feedback_count, 1);
        assert_eq!(course.avg_rating, 5.0);
    }

    #[tokio::test]
    async fn submit_feedback_requires_token() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;

        let req = request(
            "POST",
            "/api/feedbacks",
            None,
            Some(feedback_body(&data, data.student.id, 5)),
        );
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Authentication required");
    }

    #[tokio::test]
    async fn three_ratings_average_to_four() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);

        for rating in [5, 3, 4] {
            let req = request(
                "POST",
                "/api/feedbacks",
                Some(&token),
                Some(feedback_body(&data, data.student.id, rating)),
            );
            let response = app.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let course = CourseModel::find(app_state.db(), data.course.id).await.unwrap().unwrap();
        assert_eq!(course.feedback_count, 3);
        assert!((course.avg_rating - 4.0).abs() < 1e-9);

        let instructor = InstructorModel::find(app_state.db(), data.instructor.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(instructor.feedback_count, 3);
        assert!((instructor.avg_rating - 4.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn eleventh_submission_is_rate_limited() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);

        for _ in 0..10 {
            let req = request(
                "POST",
                "/api/feedbacks",
                Some(&token),
                Some(feedback_body(&data, data.student.id, 4)),
            );
            let response = app.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let req = request(
            "POST",
            "/api/feedbacks",
            Some(&token),
            Some(feedback_body(&data, data.student.id, 4)),
        );
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-limit"], "10");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        assert!(response.headers().contains_key("x-ratelimit-reset"));

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["data"]["error"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(json["data"]["status"], 429);
        assert_eq!(json["data"]["path"], "/api/feedbacks");
        assert!(json["data"]["timestamp"].is_string());

        let course = CourseModel::find(app_state.db(), data.course.id).await.unwrap().unwrap();
        assert_eq!(course.feedback_count, 10);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);

        let req = request(
            "POST",
            "/api/feedbacks",
            Some(&token),
            Some(feedback_body(&data, data.student.id, 6)),
        );
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["data"]["error"], "BAD_REQUEST");
        assert_eq!(json["message"], "Course rating must be between 1 and 5");
    }

    #[tokio::test]
    async fn student_not_enrolled_is_forbidden() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.other_student.id, false);

        let body = json!({
            "courseRating": 4,
            "instructorRating": 4,
            "studentId": data.other_student.id,
            "courseId": data.other_course.id,
            "instructorId": data.instructor.id
        })
        .to_string();
        let response = app
            .oneshot(request("POST", "/api/feedbacks", Some(&token), Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["data"]["error"], "NOT_ENROLLED");
    }

    #[tokio::test]
    async fn teacher_cannot_submit_feedback() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.teacher.id, false);

        let req = request(
            "POST",
            "/api/feedbacks",
            Some(&token),
            Some(feedback_body(&data, data.teacher.id, 5)),
        );
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["data"]["error"], "ROLE_VIOLATION");
    }

    #[tokio::test]
    async fn student_cannot_submit_for_someone_else() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.other_student.id, false);

        let req = request(
            "POST",
            "/api/feedbacks",
            Some(&token),
            Some(feedback_body(&data, data.student.id, 5)),
        );
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["data"]["error"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn admin_may_submit_on_behalf_of_student() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.admin.id, true);

        let req = request(
            "POST",
            "/api/feedbacks",
            Some(&token),
            Some(feedback_body(&data, data.student.id, 2)),
        );
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["studentName"], "Sam Student");
    }

    #[tokio::test]
    async fn unknown_instructor_is_not_found() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);

        let body = json!({
            "courseRating": 4,
            "instructorRating": 4,
            "studentId": data.student.id,
            "courseId": data.course.id,
            "instructorId": 9999
        })
        .to_string();
        let response = app
            .oneshot(request("POST", "/api/feedbacks", Some(&token), Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["data"]["error"], "NOT_FOUND");
    }
}
