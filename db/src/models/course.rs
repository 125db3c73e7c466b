use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryOrder, Set};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub instructor_id: Option<i64>,

    /// Running mean of the course ratings of all visible feedback.
    pub avg_rating: f64,
    pub feedback_count: i64,
    /// Bumped on every aggregate write; guards against lost updates.
    pub version: i64,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::instructor::Entity",
        from = "Column::InstructorId",
        to = "super::instructor::Column::Id",
        on_delete = "SetNull"
    )]
    Instructor,

    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,

    #[sea_orm(has_many = "super::feedback::Entity")]
    Feedback,
}

impl Related<super::instructor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instructor.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl Related<super::feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedback.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        name: &str,
        description: Option<&str>,
        instructor_id: Option<i64>,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            name: Set(name.to_owned()),
            description: Set(description.map(str::to_owned)),
            instructor_id: Set(instructor_id),
            avg_rating: Set(0.0),
            feedback_count: Set(0),
            version: Set(0),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// Writes a new aggregate only if nobody else has since the `expected_version` read.
    ///
    /// Returns `false` when the row changed underneath the caller.
    pub async fn apply_aggregate<C: ConnectionTrait>(
        db: &C,
        id: i64,
        expected_version: i64,
        avg_rating: f64,
        feedback_count: i64,
    ) -> Result<bool, DbErr> {
        let res = Entity::update_many()
            .col_expr(Column::AvgRating, Expr::value(avg_rating))
            .col_expr(Column::FeedbackCount, Expr::value(feedback_count))
            .col_expr(Column::Version, Expr::col(Column::Version).add(1))
            .filter(Column::Id.eq(id))
            .filter(Column::Version.eq(expected_version))
            .exec(db)
            .await?;
        Ok(res.rows_affected == 1)
    }

    /// Courses with at least one visible feedback, best rated first.
    pub async fn ranked<C: ConnectionTrait>(
        db: &C,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Model>, u64), DbErr> {
        let paginator = Entity::find()
            .filter(Column::FeedbackCount.gt(0))
            .order_by_desc(Column::AvgRating)
            .order_by_desc(Column::FeedbackCount)
            .order_by_asc(Column::Id)
            .paginate(db, per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    pub async fn all_by_name<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, DbErr> {
        Entity::find().order_by_asc(Column::Name).all(db).await
    }
}
