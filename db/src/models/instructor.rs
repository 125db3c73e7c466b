use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryOrder, Set};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "instructors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department: Option<String>,

    /// Running mean of the instructor ratings of all visible feedback.
    pub avg_rating: f64,
    pub feedback_count: i64,
    /// Bumped on every aggregate write; guards against lost updates.
    pub version: i64,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::course::Entity")]
    Course,

    #[sea_orm(has_many = "super::feedback::Entity")]
    Feedback,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
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
        email: &str,
        department: Option<&str>,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            department: Set(department.map(str::to_owned)),
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

    /// Instructors with at least one visible feedback, best rated first.
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
}
