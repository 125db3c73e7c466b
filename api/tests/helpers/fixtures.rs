use axum::{
    body::Body,
    http::Request,
    response::Response,
};
use db::models::{
    course::Model as CourseModel,
    enrollment::Model as EnrollmentModel,
    instructor::Model as InstructorModel,
    user::{Model as UserModel, Role},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::helpers::app::TestApp;

pub struct TestData {
    pub admin: UserModel,
    pub student: UserModel,
    pub other_student: UserModel,
    pub teacher: UserModel,
    pub instructor: InstructorModel,
    pub course: CourseModel,
    pub other_course: CourseModel,
}

/// Two students enrolled in `course`; only `student` is enrolled in `other_course`.
pub async fn setup_test_data(db: &sea_orm::DatabaseConnection) -> TestData {
    let admin = UserModel::create(db, "admin", "admin@example.com", "Ada Admin", Role::Admin)
        .await
        .unwrap();
    let student = UserModel::create(db, "u21000001", "s1@example.com", "Sam Student", Role::Student)
        .await
        .unwrap();
    let other_student =
        UserModel::create(db, "u21000002", "s2@example.com", "Olive Other", Role::Student)
            .await
            .unwrap();
    let teacher = UserModel::create(db, "tlee", "tlee@example.com", "Terry Lee", Role::Teacher)
        .await
        .unwrap();

    let instructor = InstructorModel::create(db, "Dr. Nkosi", "nkosi@example.com", Some("CS"))
        .await
        .unwrap();
    let course = CourseModel::create(db, "Data Structures", Some("COS212"), Some(instructor.id))
        .await
        .unwrap();
    let other_course = CourseModel::create(db, "Algorithms", None, Some(instructor.id))
        .await
        .unwrap();

    EnrollmentModel::create(db, student.id, course.id).await.unwrap();
    EnrollmentModel::create(db, other_student.id, course.id).await.unwrap();
    EnrollmentModel::create(db, student.id, other_course.id).await.unwrap();

    TestData {
        admin,
        student,
        other_student,
        teacher,
        instructor,
        course,
        other_course,
    }
}

pub fn feedback_body(data: &TestData, student_id: i64, course_rating: i32) -> String {
    json!({
        "courseRating": course_rating,
        "courseComment": "Well paced",
        "instructorRating": 4,
        "instructorComment": null,
        "anonymous": false,
        "studentId": student_id,
        "courseId": data.course.id,
        "instructorId": data.instructor.id
    })
    .to_string()
}

pub async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Builds a request, with a bearer token and a JSON body when given.
pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Submits feedback through the API and returns the new record's id.
pub async fn submit(app: &TestApp, token: &str, data: &TestData, student_id: i64, rating: i32) -> i64 {
    let req = request(
        "POST",
        "/api/feedbacks",
        Some(token),
        Some(feedback_body(data, student_id, rating)),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
