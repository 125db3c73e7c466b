use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::ConnectionTrait;

/// Database-backed daily submission counter, one row per quota key.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submission_quotas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub quota_key: String,
    pub count: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Increments the counter for `key` and returns the new value in one statement.
    ///
    /// The first increment creates the row with the given expiry; later ones
    /// leave the expiry untouched.
    pub async fn increment<C: ConnectionTrait>(
        db: &C,
        key: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i64, DbErr> {
        let stmt = Query::insert()
            .into_table(Entity)
            .columns([Column::QuotaKey, Column::Count, Column::ExpiresAt])
            .values_panic([key.into(), 1i64.into(), expires_at.into()])
            .on_conflict(
                OnConflict::column(Column::QuotaKey)
                    .value(Column::Count, Expr::col((Entity, Column::Count)).add(1))
                    .to_owned(),
            )
            .returning_col(Column::Count)
            .to_owned();

        let row = db
            .query_one(db.get_database_backend().build(&stmt))
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("quota counter {key}")))?;
        row.try_get("", "count")
    }

    /// Current value of an unexpired counter, zero otherwise.
    pub async fn current<C: ConnectionTrait>(
        db: &C,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<i64, DbErr> {
        let row = Entity::find_by_id(key.to_owned())
            .filter(Column::ExpiresAt.gt(now))
            .one(db)
            .await?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    pub async fn purge_expired<C: ConnectionTrait>(
        db: &C,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let res = Entity::delete_many()
            .filter(Column::ExpiresAt.lte(now))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }
}
