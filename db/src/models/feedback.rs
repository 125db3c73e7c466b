use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Order, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

/// A student's rating of one course and its instructor.
///
/// Rows are never read through `Entity::find()` directly; every query starts
/// from [`select`] so the visibility of soft-deleted rows is always explicit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "feedback")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub course_rating: i32,
    pub instructor_rating: i32,
    pub course_comment: Option<String>,
    pub instructor_comment: Option<String>,
    pub anonymous: bool,

    pub student_id: i64,
    pub course_id: i64,
    pub instructor_id: i64,

    pub submitted_at: NaiveDate,
    pub updated_at: DateTime<Utc>,

    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Username of whoever soft-deleted the record.
    pub deleted_by: Option<String>,
    /// Username of whoever last restored the record.
    pub restored_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Student,

    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id",
        on_delete = "Cascade"
    )]
    Course,

    #[sea_orm(
        belongs_to = "super::instructor::Entity",
        from = "Column::InstructorId",
        to = "super::instructor::Column::Id",
        on_delete = "Cascade"
    )]
    Instructor,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::instructor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instructor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Which lifecycle states a feedback query may observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Records counted in the aggregates. Every ordinary read uses this.
    #[default]
    Active,
    /// Soft-deleted records only: the recovery listing and restore lookup.
    Deleted,
    /// Both states. Only the purge lookup needs this.
    Any,
}

impl Visibility {
    pub fn scope(self, query: Select<Entity>) -> Select<Entity> {
        match self {
            Visibility::Active => query.filter(Column::IsDeleted.eq(false)),
            Visibility::Deleted => query.filter(Column::IsDeleted.eq(true)),
            Visibility::Any => query,
        }
    }
}

/// Starting point for every feedback query.
pub fn select(visibility: Visibility) -> Select<Entity> {
    visibility.scope(Entity::find())
}

/// Field values for a new record; ratings are validated by the caller.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub course_rating: i32,
    pub instructor_rating: i32,
    pub course_comment: Option<String>,
    pub instructor_comment: Option<String>,
    pub anonymous: bool,
    pub student_id: i64,
    pub course_id: i64,
    pub instructor_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    SubmittedAt,
    CourseRating,
    InstructorRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Optional narrowing of the per-course listing.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub anonymous: Option<bool>,
    pub sort: SortField,
    pub order: SortOrder,
}

impl ListFilter {
    fn apply(&self, mut query: Select<Entity>) -> Select<Entity> {
        if let Some(min) = self.min_rating {
            query = query.filter(Column::CourseRating.gte(min));
        }
        if let Some(max) = self.max_rating {
            query = query.filter(Column::CourseRating.lte(max));
        }
        if let Some(anonymous) = self.anonymous {
            query = query.filter(Column::Anonymous.eq(anonymous));
        }
        let column = match self.sort {
            SortField::SubmittedAt => Column::SubmittedAt,
            SortField::CourseRating => Column::CourseRating,
            SortField::InstructorRating => Column::InstructorRating,
        };
        let order = match self.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        query.order_by(column, order.clone()).order_by(Column::Id, order)
    }
}

async fn fetch_page<C: ConnectionTrait>(
    db: &C,
    query: Select<Entity>,
    page: u64,
    per_page: u64,
) -> Result<(Vec<Model>, u64), DbErr> {
    let paginator = query.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
    Ok((rows, total))
}

impl Model {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        new: NewFeedback,
        submitted_at: NaiveDate,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            course_rating: Set(new.course_rating),
            instructor_rating: Set(new.instructor_rating),
            course_comment: Set(new.course_comment),
            instructor_comment: Set(new.instructor_comment),
            anonymous: Set(new.anonymous),
            student_id: Set(new.student_id),
            course_id: Set(new.course_id),
            instructor_id: Set(new.instructor_id),
            submitted_at: Set(submitted_at),
            updated_at: Set(Utc::now()),
            is_deleted: Set(false),
            deleted_at: Set(None),
            deleted_by: Set(None),
            restored_by: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_scoped<C: ConnectionTrait>(
        db: &C,
        id: i64,
        visibility: Visibility,
    ) -> Result<Option<Model>, DbErr> {
        select(visibility).filter(Column::Id.eq(id)).one(db).await
    }

    pub async fn list_for_course<C: ConnectionTrait>(
        db: &C,
        course_id: i64,
        filter: &ListFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Model>, u64), DbErr> {
        let query = filter.apply(select(Visibility::Active).filter(Column::CourseId.eq(course_id)));
        fetch_page(db, query, page, per_page).await
    }

    pub async fn list_for_student<C: ConnectionTrait>(
        db: &C,
        student_id: i64,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Model>, u64), DbErr> {
        let query = select(Visibility::Active)
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id);
        fetch_page(db, query, page, per_page).await
    }

    /// Recovery listing: soft-deleted records, most recently deleted first.
    pub async fn list_deleted<C: ConnectionTrait>(
        db: &C,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Model>, u64), DbErr> {
        let query = select(Visibility::Deleted)
            .order_by_desc(Column::DeletedAt)
            .order_by_desc(Column::Id);
        fetch_page(db, query, page, per_page).await
    }

    pub async fn recent_for_course<C: ConnectionTrait>(
        db: &C,
        course_id: i64,
        since: NaiveDate,
    ) -> Result<Vec<Model>, DbErr> {
        select(Visibility::Active)
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::SubmittedAt.gte(since))
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .all(db)
            .await
    }

    pub async fn mark_deleted<C: ConnectionTrait>(
        self,
        db: &C,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<Model, DbErr> {
        let mut active: ActiveModel = self.into();
        active.is_deleted = Set(true);
        active.deleted_at = Set(Some(at));
        active.deleted_by = Set(Some(actor.to_owned()));
        active.update(db).await
    }

    pub async fn mark_restored<C: ConnectionTrait>(
        self,
        db: &C,
        actor: &str,
    ) -> Result<Model, DbErr> {
        let mut active: ActiveModel = self.into();
        active.is_deleted = Set(false);
        active.deleted_at = Set(None);
        active.deleted_by = Set(None);
        active.restored_by = Set(Some(actor.to_owned()));
        active.update(db).await
    }

    /// Overwrites the editable fields, keeping the owner and lifecycle state.
    pub async fn replace_content<C: ConnectionTrait>(
        self,
        db: &C,
        content: NewFeedback,
    ) -> Result<Model, DbErr> {
        let mut active: ActiveModel = self.into();
        active.course_rating = Set(content.course_rating);
        active.instructor_rating = Set(content.instructor_rating);
        active.course_comment = Set(content.course_comment);
        active.instructor_comment = Set(content.instructor_comment);
        active.anonymous = Set(content.anonymous);
        active.course_id = Set(content.course_id);
        active.instructor_id = Set(content.instructor_id);
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    pub async fn purge<C: ConnectionTrait>(self, db: &C) -> Result<(), DbErr> {
        Entity::delete_by_id(self.id).exec(db).await?;
        Ok(())
    }
}
