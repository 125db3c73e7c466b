#[cfg(test)]
mod tests {
    use crate::helpers::{body_json, make_test_app, request, setup_test_data, submit};
    use api::auth::generate_jwt;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn student_history_lists_only_their_feedback() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        let (other_token, _) = generate_jwt(data.other_student.id, false);

        submit(&app, &token, &data, data.student.id, 5).await;
        submit(&app, &token, &data, data.student.id, 4).await;
        submit(&app, &other_token, &data, data.other_student.id, 1).await;

        let uri = format!("/api/students/{}/feedbacks", data.student.id);
        let response = app.oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["data"]["total"], 2);
        assert!(
            json["data"]["items"]
                .as_array()
                .unwrap()
                .iter()
                .all(|f| f["studentName"] == "Sam Student")
        );
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);

        let response = app
            .oneshot(request("GET", "/api/students/9999/feedbacks", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
