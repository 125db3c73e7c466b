//! Read-only queries backing the analytics reports.
//!
//! All of them observe active feedback only.

use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, QueryFilter, QueryOrder, QuerySelect};

use crate::models::feedback::{self, Column, Visibility};

/// Submission dates of every active feedback, oldest first.
pub async fn submitted_dates<C: ConnectionTrait>(db: &C) -> Result<Vec<NaiveDate>, DbErr> {
    feedback::select(Visibility::Active)
        .select_only()
        .column(Column::SubmittedAt)
        .order_by_asc(Column::SubmittedAt)
        .into_tuple::<NaiveDate>()
        .all(db)
        .await
}

/// `(course_rating, number of feedbacks)` pairs.
pub async fn course_rating_counts<C: ConnectionTrait>(db: &C) -> Result<Vec<(i32, i64)>, DbErr> {
    feedback::select(Visibility::Active)
        .select_only()
        .column(Column::CourseRating)
        .column_as(Expr::col(Column::Id).count(), "total")
        .group_by(Column::CourseRating)
        .order_by_asc(Column::CourseRating)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await
}

/// `(instructor_rating, number of feedbacks)` pairs for one instructor.
pub async fn instructor_rating_counts<C: ConnectionTrait>(
    db: &C,
    instructor_id: i64,
) -> Result<Vec<(i32, i64)>, DbErr> {
    feedback::select(Visibility::Active)
        .filter(Column::InstructorId.eq(instructor_id))
        .select_only()
        .column(Column::InstructorRating)
        .column_as(Expr::col(Column::Id).count(), "total")
        .group_by(Column::InstructorRating)
        .order_by_asc(Column::InstructorRating)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await
}

/// `(course_rating, instructor_rating)` of feedback submitted on or after `since`.
pub async fn ratings_since<C: ConnectionTrait>(
    db: &C,
    since: NaiveDate,
) -> Result<Vec<(i32, i32)>, DbErr> {
    feedback::select(Visibility::Active)
        .filter(Column::SubmittedAt.gte(since))
        .select_only()
        .column(Column::CourseRating)
        .column(Column::InstructorRating)
        .into_tuple::<(i32, i32)>()
        .all(db)
        .await
}
