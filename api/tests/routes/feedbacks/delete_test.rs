#[cfg(test)]
mod tests {
    use crate::helpers::{body_json, make_test_app, request, setup_test_data, submit};
    use api::auth::generate_jwt;
    use axum::http::StatusCode;
    use db::models::course::Model as CourseModel;
    use tower::ServiceExt;

    #[tokio::test]
    async fn soft_delete_hides_feedback_and_updates_aggregate() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        submit(&app, &token, &data, data.student.id, 2).await;
        let id = submit(&app, &token, &data, data.student.id, 4).await;
        let uri = format!("/api/feedbacks/{}", id);

        let response = app
            .clone()
            .oneshot(request("DELETE", &uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Feedback deleted successfully");
        assert_eq!(json["data"]["deletedBy"], "u21000001");
        assert_ne!(json["data"]["deletedAt"], "Not yet deleted");

        let response = app.oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let course = CourseModel::find(app_state.db(), data.course.id).await.unwrap().unwrap();
        assert_eq!((course.avg_rating, course.feedback_count), (2.0, 1));
    }

    #[tokio::test]
    async fn soft_delete_by_other_student_is_forbidden() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (owner_token, _) = generate_jwt(data.student.id, false);
        let (other_token, _) = generate_jwt(data.other_student.id, false);
        let id = submit(&app, &owner_token, &data, data.student.id, 4).await;

        let uri = format!("/api/feedbacks/{}", id);
        let response = app
            .oneshot(request("DELETE", &uri, Some(&other_token), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["data"]["error"], "FORBIDDEN");
        assert_eq!(json["data"]["path"], uri);
    }

    #[tokio::test]
    async fn admin_may_soft_delete_any_feedback() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (student_token, _) = generate_jwt(data.student.id, false);
        let (admin_token, _) = generate_jwt(data.admin.id, true);
        let id = submit(&app, &student_token, &data, data.student.id, 4).await;

        let uri = format!("/api/feedbacks/{}", id);
        let response = app
            .oneshot(request("DELETE", &uri, Some(&admin_token), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["deletedBy"], "admin");
    }

    #[tokio::test]
    async fn purging_only_feedback_empties_aggregate() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        let id = submit(&app, &token, &data, data.student.id, 5).await;

        let uri = format!("/api/feedbacks/{}/permanent", id);
        let response = app
            .clone()
            .oneshot(request("DELETE", &uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Feedback permanently deleted");

        let course = CourseModel::find(app_state.db(), data.course.id).await.unwrap().unwrap();
        assert_eq!((course.avg_rating, course.feedback_count), (0.0, 0));

        let response = app.oneshot(request("DELETE", &uri, Some(&token), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn purging_soft_deleted_feedback_does_not_subtract_twice() {
        let (app, app_state) = make_test_app().await;
        let data = setup_test_data(app_state.db()).await;
        let (token, _) = generate_jwt(data.student.id, false);
        submit(&app, &token, &data, data.student.id, 3).await;
        let id = submit(&app, &token, &data, data.student.id, 5).await;

        let uri = format!("/api/feedbacks/{}", id);
        app.clone()
            .oneshot(request("DELETE", &uri, Some(&token), None))
            .await
            .unwrap();

        let purge_uri = format!("/api/feedbacks/{}/permanent", id);
        let response = app
            .oneshot(request("DELETE", &purge_uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let course = CourseModel::find(app_state.db(), data.course.id).await.unwrap().unwrap();
        assert_eq!((course.avg_rating, course.feedback_count), (3.0, 1));
    }
}
