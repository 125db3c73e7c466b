use db::models::{course, enrollment, user};
use sea_orm::ConnectionTrait;

use crate::actor::Actor;
use crate::error::AppError;

/// Role, enrollment and ownership checks run before any feedback is touched.
pub struct EligibilityGuard;

impl EligibilityGuard {
    /// Checks that `student_id` is an existing student enrolled in `course_id`.
    ///
    /// Returns the loaded student and course so callers don't fetch them twice.
    pub async fn assert_can_submit<C: ConnectionTrait>(
        db: &C,
        student_id: i64,
        course_id: i64,
    ) -> Result<(user::Model, course::Model), AppError> {
        let student = user::Model::find(db, student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student {student_id}")))?;

        if student.role != user::Role::Student {
            return Err(AppError::RoleViolation(format!(
                "Only students can submit feedback; user {} is a {}",
                student.id, student.role
            )));
        }

        let course = course::Model::find(db, course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {course_id}")))?;

        if !enrollment::Model::exists(db, student.id, course.id).await? {
            return Err(AppError::NotEnrolled { student_id: student.id, course_id: course.id });
        }

        Ok((student, course))
    }

    /// Only the owner of a feedback record, or an administrator, may change it.
    pub fn assert_can_mutate(actor: &Actor, owner_id: i64) -> Result<(), AppError> {
        if actor.id == owner_id || actor.is_administrative() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "User {} may not modify feedback owned by user {}",
                actor.id, owner_id
            )))
        }
    }

    /// Submitting in someone else's name requires an administrator.
    pub fn assert_can_act_for(actor: &Actor, student_id: i64) -> Result<(), AppError> {
        if actor.id == student_id || actor.is_administrative() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "User {} may not submit feedback as student {}",
                actor.id, student_id
            )))
        }
    }
}
