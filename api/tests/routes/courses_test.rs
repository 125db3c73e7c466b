#[cfg(test)]
mod tests {
    use crate::helpers::{body_json, make_test_app, request, setup_test_data, submit};
    use api::auth::generate_jwt;
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn course_listing_masks_anonymous_students() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        let (other_token, _) = generate_jwt(data.other_student.id, false);

        submit(&app, &token, &data, data.student.id, 5).await;
        let body = json!({
            "courseRating": 2,
            "instructorRating": 3,
            "anonymous": true,
            "studentId": data.other_student.id,
            "courseId": data.course.id,
            "instructorId": data.instructor.id
        })
        .to_string();
        let response = app
            .clone()
            .oneshot(request("POST", "/api/feedbacks", Some(&other_token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let uri = format!("/api/courses/{}/feedbacks?sort=course_rating&order=asc", data.course.id);
        let response = app.oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let items = json["data"]["items"].as_array().unwrap();
        assert_eq!(json["data"]["total"], 2);
        assert_eq!(items[0]["courseRating"], 2);
        assert_eq!(items[0]["studentName"], "Anonymous");
        assert_eq!(items[1]["studentName"], "Sam Student");
    }

    #[tokio::test]
    async fn course_listing_filters_by_rating_and_hides_deleted() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);

        submit(&app, &token, &data, data.student.id, 1).await;
        submit(&app, &token, &data, data.student.id, 4).await;
        let removed = submit(&app, &token, &data, data.student.id, 5).await;

        let uri = format!("/api/feedbacks/{}", removed);
        app.clone()
            .oneshot(request("DELETE", &uri, Some(&token), None))
            .await
            .unwrap();

        let uri = format!("/api/courses/{}/feedbacks?min_rating=3", data.course.id);
        let response = app.oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let items = json["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["courseRating"], 4);
    }

    #[tokio::test]
    async fn course_listing_pages_results() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        for rating in [1, 2, 3] {
            submit(&app, &token, &data, data.student.id, rating).await;
        }

        let uri = format!("/api/courses/{}/feedbacks?page=2&per_page=2", data.course.id);
        let response = app.oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();

        let json = body_json(response).await;
        assert_eq!(json["data"]["page"], 2);
        assert_eq!(json["data"]["per_page"], 2);
        assert_eq!(json["data"]["total"], 3);
        assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);

        let response = app
            .oneshot(request("GET", "/api/courses/9999/feedbacks", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn recent_feedback_includes_todays_submissions() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        let id = submit(&app, &token, &data, data.student.id, 4).await;

        let uri = format!("/api/courses/{}/feedbacks/recent?days=1", data.course.id);
        let response = app.oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let items = json["data"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], id);
    }

    #[tokio::test]
    async fn recent_feedback_rejects_out_of_range_days() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);

        for days in [0u32, 367, 100_000_000] {
            let uri = format!("/api/courses/{}/feedbacks/recent?days={days}", data.course.id);
            let response = app
                .clone()
                .oneshot(request("GET", &uri, Some(&token), None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "days={days}");

            let json = body_json(response).await;
            assert_eq!(json["success"], false);
            assert_eq!(json["data"]["error"], "BAD_REQUEST");
        }
    }
}
