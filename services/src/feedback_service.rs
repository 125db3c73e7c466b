//! Feedback lifecycle: submit, edit, soft-delete, restore and purge.
//!
//! ```text
//!   submit ─► ACTIVE ──soft_delete──► SOFT_DELETED
//!               ▲  │                      │
//!               │  └─edit (ACTIVE)        │
//!               └───────restore───────────┘
//!   purge: ACTIVE | SOFT_DELETED ─► gone
//! ```
//!
//! Every transition runs in one database transaction: guards, the feedback
//! row and both aggregate updates commit together or not at all. Transitions
//! go through a single writer: each one waits for the previous to commit and
//! takes the database write lock before its first read. Aggregate writes are
//! still version-checked, and a transition that loses a race anyway is rolled
//! back and re-run from the start.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use db::aggregate::{claim_write_lock, AggregateRoot};
use db::models::feedback::{self, ListFilter, NewFeedback, Visibility};
use db::models::{course, instructor, user};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, TransactionTrait,
};
use tokio::sync::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::actor::Actor;
use crate::aggregate::{AggregateChange, AggregateRatingUpdater, Rating};
use crate::eligibility::EligibilityGuard;
use crate::error::{AppError, RateLimitInfo};
use crate::pagination::Page;
use crate::quota::QuotaTracker;
use crate::report_cache::ReportCache;
use crate::retry::retry_on_conflict;
use crate::window::window_start;

pub const ANONYMOUS_NAME: &str = "Anonymous";
pub const NOT_DELETED: &str = "Not yet deleted";

/// Body of a submission or an edit.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[validate(range(min = 1, max = 5, message = "Course rating must be between 1 and 5"))]
    pub course_rating: i32,

    #[validate(length(max = 1000, message = "Course comment must be at most 1000 characters"))]
    pub course_comment: Option<String>,

    #[validate(range(min = 1, max = 5, message = "Instructor rating must be between 1 and 5"))]
    pub instructor_rating: i32,

    #[validate(length(max = 1000, message = "Instructor comment must be at most 1000 characters"))]
    pub instructor_comment: Option<String>,

    #[serde(default)]
    pub anonymous: bool,

    pub student_id: i64,
    pub course_id: i64,
    pub instructor_id: i64,
}

impl FeedbackRequest {
    fn ratings(&self) -> Result<(Rating, Rating), AppError> {
        Ok((Rating::new(self.course_rating)?, Rating::new(self.instructor_rating)?))
    }

    fn content(&self) -> NewFeedback {
        NewFeedback {
            course_rating: self.course_rating,
            instructor_rating: self.instructor_rating,
            course_comment: self.course_comment.clone(),
            instructor_comment: self.instructor_comment.clone(),
            anonymous: self.anonymous,
            student_id: self.student_id,
            course_id: self.course_id,
            instructor_id: self.instructor_id,
        }
    }
}

/// Read model of a feedback record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
    pub id: i64,
    pub course_rating: i32,
    pub course_id: i64,
    pub course_name: String,
    pub anonymous: bool,
    pub student_name: String,
    pub instructor_rating: i32,
    pub course_comment: Option<String>,
    pub instructor_id: i64,
    pub instructor_name: String,
    pub submitted_at: NaiveDate,
    pub instructor_comment: Option<String>,
    pub deleted_at: String,
    pub deleted_by: Option<String>,
    pub restored_by: Option<String>,
}

impl FeedbackView {
    fn build(record: feedback::Model, student_name: &str, course_name: &str, instructor_name: &str) -> Self {
        FeedbackView {
            id: record.id,
            course_rating: record.course_rating,
            course_id: record.course_id,
            course_name: course_name.to_owned(),
            anonymous: record.anonymous,
            student_name: if record.anonymous {
                ANONYMOUS_NAME.to_owned()
            } else {
                student_name.to_owned()
            },
            instructor_rating: record.instructor_rating,
            course_comment: record.course_comment,
            instructor_id: record.instructor_id,
            instructor_name: instructor_name.to_owned(),
            submitted_at: record.submitted_at,
            instructor_comment: record.instructor_comment,
            deleted_at: record
                .deleted_at
                .map(|at: DateTime<Utc>| at.to_rfc3339())
                .unwrap_or_else(|| NOT_DELETED.to_owned()),
            deleted_by: record.deleted_by,
            restored_by: record.restored_by,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submitted {
    pub feedback: FeedbackView,
    pub quota: RateLimitInfo,
}

pub struct FeedbackLifecycleManager {
    db: DatabaseConnection,
    quota: QuotaTracker,
    cache: Arc<ReportCache>,
    max_retries: u32,
    writer: Mutex<()>,
}

impl FeedbackLifecycleManager {
    pub fn new(db: DatabaseConnection, quota: QuotaTracker, cache: Arc<ReportCache>, max_retries: u32) -> Self {
        Self { db, quota, cache, max_retries, writer: Mutex::new(()) }
    }

    /// Waits for the writer slot and opens a transaction holding the write lock.
    ///
    /// Keep the guard alive until the transaction has committed.
    async fn begin_write(&self) -> Result<(MutexGuard<'_, ()>, DatabaseTransaction), AppError> {
        let gate = self.writer.lock().await;
        let txn = self.db.begin().await?;
        claim_write_lock(&txn).await?;
        Ok((gate, txn))
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    /// Records new feedback and adds its ratings to the course and instructor aggregates.
    ///
    /// The quota is consumed before eligibility is checked, so rejected
    /// attempts count against the student's daily limit.
    pub async fn submit(&self, actor: &Actor, req: FeedbackRequest) -> Result<Submitted, AppError> {
        req.validate()?;
        EligibilityGuard::assert_can_act_for(actor, req.student_id)?;
        let quota = self.quota.check_and_consume(req.student_id).await?;

        let (view, roots) = retry_on_conflict(self.max_retries, || self.try_submit(&req)).await?;
        self.cache.invalidate(&roots).await;

        tracing::info!(
            event = "FEEDBACK_SUBMITTED",
            feedback_id = view.id,
            student_id = req.student_id,
            course_id = req.course_id,
            instructor_id = req.instructor_id,
            remaining = quota.remaining,
            "Feedback submitted"
        );
        Ok(Submitted { feedback: view, quota })
    }

    async fn try_submit(&self, req: &FeedbackRequest) -> Result<(FeedbackView, Vec<AggregateRoot>), AppError> {
        let (course_rating, instructor_rating) = req.ratings()?;
        let (_gate, txn) = self.begin_write().await?;

        let (student, course) = EligibilityGuard::assert_can_submit(&txn, req.student_id, req.course_id).await?;
        let instructor = find_instructor(&txn, req.instructor_id).await?;

        let record = feedback::Model::create(&txn, req.content(), Local::now().date_naive()).await?;

        let course_root = AggregateRoot::Course(course.id);
        let instructor_root = AggregateRoot::Instructor(instructor.id);
        AggregateRatingUpdater::apply(&txn, course_root, AggregateChange::Add(course_rating)).await?;
        AggregateRatingUpdater::apply(&txn, instructor_root, AggregateChange::Add(instructor_rating)).await?;

        txn.commit().await?;

        let view = FeedbackView::build(record, &student.full_name, &course.name, &instructor.name);
        Ok((view, vec![course_root, instructor_root]))
    }

    /// Edits a visible record in place.
    ///
    /// If the course or instructor stays the same, the old rating is replaced
    /// in that aggregate. If it changes, the old rating leaves the previous
    /// aggregate and the new one joins the new aggregate.
    pub async fn edit(&self, actor: &Actor, id: i64, req: FeedbackRequest) -> Result<FeedbackView, AppError> {
        req.validate()?;
        let (view, roots) = retry_on_conflict(self.max_retries, || self.try_edit(actor, id, &req)).await?;
        self.cache.invalidate(&roots).await;

        tracing::info!(
            event = "FEEDBACK_EDITED",
            feedback_id = id,
            actor_id = actor.id,
            course_id = req.course_id,
            instructor_id = req.instructor_id,
            "Feedback edited"
        );
        Ok(view)
    }

    async fn try_edit(
        &self,
        actor: &Actor,
        id: i64,
        req: &FeedbackRequest,
    ) -> Result<(FeedbackView, Vec<AggregateRoot>), AppError> {
        let (course_rating, instructor_rating) = req.ratings()?;
        let (_gate, txn) = self.begin_write().await?;

        let existing = find_feedback(&txn, id, Visibility::Active).await?;
        EligibilityGuard::assert_can_mutate(actor, existing.student_id)?;
        if req.student_id != existing.student_id {
            return Err(AppError::BadRequest("The owner of a feedback cannot be changed".into()));
        }

        let (student, course) = EligibilityGuard::assert_can_submit(&txn, existing.student_id, req.course_id).await?;
        let instructor = find_instructor(&txn, req.instructor_id).await?;

        let old_course_rating = Rating::new(existing.course_rating)?;
        let old_instructor_rating = Rating::new(existing.instructor_rating)?;

        let mut roots = Vec::with_capacity(4);
        roots.extend(
            shift(
                &txn,
                AggregateRoot::Course(existing.course_id),
                AggregateRoot::Course(course.id),
                old_course_rating,
                course_rating,
            )
            .await?,
        );
        roots.extend(
            shift(
                &txn,
                AggregateRoot::Instructor(existing.instructor_id),
                AggregateRoot::Instructor(instructor.id),
                old_instructor_rating,
                instructor_rating,
            )
            .await?,
        );

        let updated = existing.replace_content(&txn, req.content()).await?;
        txn.commit().await?;

        let view = FeedbackView::build(updated, &student.full_name, &course.name, &instructor.name);
        Ok((view, roots))
    }

    /// Hides a visible record and takes its ratings out of both aggregates.
    pub async fn soft_delete(&self, actor: &Actor, id: i64) -> Result<FeedbackView, AppError> {
        let (view, roots) = retry_on_conflict(self.max_retries, || self.try_soft_delete(actor, id)).await?;
        self.cache.invalidate(&roots).await;

        tracing::info!(event = "FEEDBACK_DELETED", feedback_id = id, deleted_by = %actor.username, "Feedback soft-deleted");
        Ok(view)
    }

    async fn try_soft_delete(&self, actor: &Actor, id: i64) -> Result<(FeedbackView, Vec<AggregateRoot>), AppError> {
        let (_gate, txn) = self.begin_write().await?;

        let existing = find_feedback(&txn, id, Visibility::Active).await?;
        EligibilityGuard::assert_can_mutate(actor, existing.student_id)?;

        let roots = remove_contribution(&txn, &existing).await?;
        let updated = existing.mark_deleted(&txn, &actor.username, Utc::now()).await?;
        let view = render_one(&txn, updated).await?;

        txn.commit().await?;
        Ok((view, roots))
    }

    /// Brings a soft-deleted record back and re-adds its ratings.
    pub async fn restore(&self, actor: &Actor, id: i64) -> Result<FeedbackView, AppError> {
        let (view, roots) = retry_on_conflict(self.max_retries, || self.try_restore(actor, id)).await?;
        self.cache.invalidate(&roots).await;

        tracing::info!(event = "FEEDBACK_RESTORED", feedback_id = id, restored_by = %actor.username, "Feedback restored");
        Ok(view)
    }

    async fn try_restore(&self, actor: &Actor, id: i64) -> Result<(FeedbackView, Vec<AggregateRoot>), AppError> {
        let (_gate, txn) = self.begin_write().await?;

        let existing = find_feedback(&txn, id, Visibility::Deleted).await?;
        EligibilityGuard::assert_can_mutate(actor, existing.student_id)?;

        let course_root = AggregateRoot::Course(existing.course_id);
        let instructor_root = AggregateRoot::Instructor(existing.instructor_id);
        let course_rating = Rating::new(existing.course_rating)?;
        let instructor_rating = Rating::new(existing.instructor_rating)?;
        AggregateRatingUpdater::apply(&txn, course_root, AggregateChange::Add(course_rating)).await?;
        AggregateRatingUpdater::apply(&txn, instructor_root, AggregateChange::Add(instructor_rating)).await?;

        let updated = existing.mark_restored(&txn, &actor.username).await?;
        let view = render_one(&txn, updated).await?;

        txn.commit().await?;
        Ok((view, vec![course_root, instructor_root]))
    }

    /// Permanently removes a record in either state.
    ///
    /// Ratings of a record that is already soft-deleted were subtracted at
    /// deletion time and are not subtracted again.
    pub async fn purge(&self, actor: &Actor, id: i64) -> Result<(), AppError> {
        let roots = retry_on_conflict(self.max_retries, || self.try_purge(actor, id)).await?;
        if !roots.is_empty() {
            self.cache.invalidate(&roots).await;
        }

        tracing::info!(event = "FEEDBACK_PERMANENTLY_DELETED", feedback_id = id, actor_id = actor.id, "Feedback purged");
        Ok(())
    }

    async fn try_purge(&self, actor: &Actor, id: i64) -> Result<Vec<AggregateRoot>, AppError> {
        let (_gate, txn) = self.begin_write().await?;

        let existing = find_feedback(&txn, id, Visibility::Any).await?;
        EligibilityGuard::assert_can_mutate(actor, existing.student_id)?;

        let roots = if existing.is_deleted {
            Vec::new()
        } else {
            remove_contribution(&txn, &existing).await?
        };
        existing.purge(&txn).await?;

        txn.commit().await?;
        Ok(roots)
    }

    // --- Read paths ---

    pub async fn get(&self, id: i64) -> Result<FeedbackView, AppError> {
        let record = find_feedback(&self.db, id, Visibility::Active).await?;
        render_one(&self.db, record).await
    }

    pub async fn list_for_course(
        &self,
        course_id: i64,
        filter: &ListFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<FeedbackView>, AppError> {
        if course::Model::find(&self.db, course_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Course {course_id}")));
        }
        let (rows, total) = feedback::Model::list_for_course(&self.db, course_id, filter, page, per_page).await?;
        Ok(Page { items: render(&self.db, rows).await?, page, per_page, total })
    }

    pub async fn list_for_student(&self, student_id: i64, page: u64, per_page: u64) -> Result<Page<FeedbackView>, AppError> {
        if user::Model::find(&self.db, student_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Student {student_id}")));
        }
        let (rows, total) = feedback::Model::list_for_student(&self.db, student_id, page, per_page).await?;
        Ok(Page { items: render(&self.db, rows).await?, page, per_page, total })
    }

    /// Soft-deleted records, for administrative recovery.
    pub async fn list_deleted(&self, actor: &Actor, page: u64, per_page: u64) -> Result<Page<FeedbackView>, AppError> {
        if !actor.is_administrative() {
            return Err(AppError::Forbidden("Only administrators can list deleted feedback".into()));
        }
        let (rows, total) = feedback::Model::list_deleted(&self.db, page, per_page).await?;
        Ok(Page { items: render(&self.db, rows).await?, page, per_page, total })
    }

    /// Visible feedback for a course from the last `days` days, today included.
    pub async fn recent_for_course(&self, course_id: i64, days: u32) -> Result<Vec<FeedbackView>, AppError> {
        let since = window_start(Local::now().date_naive(), days)?;
        if course::Model::find(&self.db, course_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Course {course_id}")));
        }
        let rows = feedback::Model::recent_for_course(&self.db, course_id, since).await?;
        render(&self.db, rows).await
    }
}

async fn find_feedback<C: ConnectionTrait>(db: &C, id: i64, visibility: Visibility) -> Result<feedback::Model, AppError> {
    feedback::Model::find_scoped(db, id, visibility)
        .await?
        .ok_or_else(|| match visibility {
            Visibility::Deleted => AppError::NotFound(format!("Deleted feedback {id}")),
            _ => AppError::NotFound(format!("Feedback {id}")),
        })
}

async fn find_instructor<C: ConnectionTrait>(db: &C, id: i64) -> Result<instructor::Model, AppError> {
    instructor::Model::find(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Instructor {id}")))
}

/// Subtracts a visible record's ratings from both of its aggregates.
async fn remove_contribution<C: ConnectionTrait>(db: &C, record: &feedback::Model) -> Result<Vec<AggregateRoot>, AppError> {
    let course_root = AggregateRoot::Course(record.course_id);
    let instructor_root = AggregateRoot::Instructor(record.instructor_id);
    AggregateRatingUpdater::apply(db, course_root, AggregateChange::Remove(Rating::new(record.course_rating)?)).await?;
    AggregateRatingUpdater::apply(db, instructor_root, AggregateChange::Remove(Rating::new(record.instructor_rating)?))
        .await?;
    Ok(vec![course_root, instructor_root])
}

/// Moves one rating contribution from `from` to `to`, replacing in place when they are the same root.
async fn shift<C: ConnectionTrait>(
    db: &C,
    from: AggregateRoot,
    to: AggregateRoot,
    old: Rating,
    new: Rating,
) -> Result<Vec<AggregateRoot>, AppError> {
    if from == to {
        AggregateRatingUpdater::apply(db, to, AggregateChange::Replace { old, new }).await?;
        Ok(vec![to])
    } else {
        AggregateRatingUpdater::apply(db, from, AggregateChange::Remove(old)).await?;
        AggregateRatingUpdater::apply(db, to, AggregateChange::Add(new)).await?;
        Ok(vec![from, to])
    }
}

async fn render_one<C: ConnectionTrait>(db: &C, record: feedback::Model) -> Result<FeedbackView, AppError> {
    let mut views = render(db, vec![record]).await?;
    views
        .pop()
        .ok_or_else(|| AppError::NotFound("Feedback".into()))
}

/// Builds views for a batch of records with one lookup per referenced table.
async fn render<C: ConnectionTrait>(db: &C, records: Vec<feedback::Model>) -> Result<Vec<FeedbackView>, AppError> {
    let student_ids: HashSet<i64> = records.iter().map(|r| r.student_id).collect();
    let course_ids: HashSet<i64> = records.iter().map(|r| r.course_id).collect();
    let instructor_ids: HashSet<i64> = records.iter().map(|r| r.instructor_id).collect();

    let students = user::Model::names_by_id(db, student_ids.into_iter().collect()).await?;
    let courses: HashMap<i64, String> = course::Entity::find()
        .filter(course::Column::Id.is_in(course_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let instructors: HashMap<i64, String> = instructor::Entity::find()
        .filter(instructor::Column::Id.is_in(instructor_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|i| (i.id, i.name))
        .collect();

    Ok(records
        .into_iter()
        .map(|record| {
            let student = students.get(&record.student_id).map(String::as_str).unwrap_or_default();
            let course = courses.get(&record.course_id).map(String::as_str).unwrap_or_default();
            let instructor = instructors.get(&record.instructor_id).map(String::as_str).unwrap_or_default();
            FeedbackView::build(record, student, course, instructor)
        })
        .collect())
}
