#[cfg(test)]
mod tests {
    use crate::helpers::{body_json, make_test_app, request, setup_test_data, submit};
    use api::auth::generate_jwt;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn get_feedback_success() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        let id = submit(&app, &token, &data, data.student.id, 3).await;

        let uri = format!("/api/feedbacks/{}", id);
        let response = app.oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["id"], id);
        assert_eq!(json["data"]["courseRating"], 3);
        assert_eq!(json["data"]["courseComment"], "Well paced");
    }

    #[tokio::test]
    async fn get_missing_feedback_is_not_found() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);

        let response = app
            .oneshot(request("GET", "/api/feedbacks/9999", Some(&token), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Feedback 9999 not found");
        assert_eq!(json["data"]["path"], "/api/feedbacks/9999");
        assert_eq!(json["data"]["status"], 404);
        assert_eq!(json["data"]["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn quota_reports_remaining_without_consuming() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        submit(&app, &token, &data, data.student.id, 4).await;

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(request("GET", "/api/feedbacks/quota", Some(&token), None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert_eq!(json["data"]["limit"], 10);
            assert_eq!(json["data"]["remaining"], 9);
            assert!(json["data"]["resetAt"].is_string());
        }
    }

    #[tokio::test]
    async fn deleted_listing_requires_admin() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);

        let response = app
            .oneshot(request("GET", "/api/feedbacks/deleted", Some(&token), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Admin access required");
    }

    #[tokio::test]
    async fn deleted_listing_shows_soft_deleted_records() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (student_token, _) = generate_jwt(data.student.id, false);
        let (admin_token, _) = generate_jwt(data.admin.id, true);

        let kept = submit(&app, &student_token, &data, data.student.id, 4).await;
        let removed = submit(&app, &student_token, &data, data.student.id, 2).await;

        let uri = format!("/api/feedbacks/{}", removed);
        let response = app
            .clone()
            .oneshot(request("DELETE", &uri, Some(&student_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request("GET", "/api/feedbacks/deleted", Some(&admin_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let items = json["data"]["items"].as_array().unwrap();
        assert_eq!(json["data"]["total"], 1);
        assert_eq!(items[0]["id"], removed);
        assert_eq!(items[0]["deletedBy"], "u21000001");
        assert!(items.iter().all(|f| f["id"] != kept));
    }
}
