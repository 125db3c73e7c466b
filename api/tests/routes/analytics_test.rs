#[cfg(test)]
mod tests {
    use crate::helpers::{body_json, make_test_app, request, setup_test_data, submit};
    use api::auth::generate_jwt;
    use axum::http::StatusCode;
    use chrono::Local;
    use tower::ServiceExt;

    #[tokio::test]
    async fn trends_group_by_day() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        submit(&app, &token, &data, data.student.id, 5).await;
        submit(&app, &token, &data, data.student.id, 3).await;

        let response = app
            .oneshot(request(
                "GET",
                "/api/analytics/feedbacks/trends?group_by=day",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(json["data"][0]["period"], today);
        assert_eq!(json["data"][0]["count"], 2);
    }

    #[tokio::test]
    async fn rating_distribution_covers_every_rating() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        submit(&app, &token, &data, data.student.id, 5).await;
        submit(&app, &token, &data, data.student.id, 5).await;
        submit(&app, &token, &data, data.student.id, 1).await;
        submit(&app, &token, &data, data.student.id, 2).await;

        let response = app
            .oneshot(request("GET", "/api/analytics/feedbacks/ratings", Some(&token), None))
            .await
            .unwrap();

        let json = body_json(response).await;
        let buckets = json["data"].as_array().unwrap();
        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets[4]["rating"], 5);
        assert_eq!(buckets[4]["count"], 2);
        assert_eq!(buckets[4]["percentage"], 50.0);
        assert_eq!(buckets[2]["count"], 0);
    }

    #[tokio::test]
    async fn course_summary_refreshes_after_submission() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        let uri = "/api/analytics/courses/summary";

        let response = app
            .clone()
            .oneshot(request("GET", uri, Some(&token), None))
            .await
            .unwrap();
        let json = body_json(response).await;
        let before = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["course_id"] == data.course.id)
            .unwrap()
            .clone();
        assert_eq!(before["feedback_count"], 0);

        submit(&app, &token, &data, data.student.id, 4).await;

        let response = app.oneshot(request("GET", uri, Some(&token), None)).await.unwrap();
        let json = body_json(response).await;
        let after = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["course_id"] == data.course.id)
            .unwrap()
            .clone();
        assert_eq!(after["feedback_count"], 1);
        assert_eq!(after["avg_rating"], 4.0);
    }

    #[tokio::test]
    async fn top_courses_skip_courses_without_feedback() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        submit(&app, &token, &data, data.student.id, 4).await;

        let response = app
            .oneshot(request("GET", "/api/analytics/courses/top", Some(&token), None))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["data"]["total"], 1);
        assert_eq!(json["data"]["items"][0]["course_name"], "Data Structures");
    }

    #[tokio::test]
    async fn top_instructors_ranked_by_average() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        submit(&app, &token, &data, data.student.id, 4).await;

        let response = app
            .oneshot(request("GET", "/api/analytics/instructors/top", Some(&token), None))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["data"]["items"][0]["name"], "Dr. Nkosi");
        assert_eq!(json["data"]["items"][0]["feedback_count"], 1);
    }

    #[tokio::test]
    async fn instructor_distribution_for_unknown_instructor() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);

        let response = app
            .clone()
            .oneshot(request(
                "GET",
                "/api/analytics/instructors/9999/distribution",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let uri = format!("/api/analytics/instructors/{}/distribution", data.instructor.id);
        let response = app.oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn recent_rating_averages() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        submit(&app, &token, &data, data.student.id, 5).await;
        submit(&app, &token, &data, data.student.id, 2).await;

        let response = app
            .clone()
            .oneshot(request("GET", "/api/analytics/courses/rating/7", Some(&token), None))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["data"]["days"], 7);
        assert_eq!(json["data"]["samples"], 2);
        assert_eq!(json["data"]["average"], 3.5);

        let response = app
            .clone()
            .oneshot(request("GET", "/api/analytics/instructors/rating/7", Some(&token), None))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["data"]["average"], 4.0);

        let response = app
            .oneshot(request("GET", "/api/analytics/courses/rating/0", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analytics_require_authentication() {
        let (app, _) = make_test_app().await;

        let response = app
            .oneshot(request("GET", "/api/analytics/courses/summary", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
