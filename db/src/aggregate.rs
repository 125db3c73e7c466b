//! Persistence side of the course and instructor rating aggregates.
//!
//! Aggregates are written with an optimistic version check: callers read an
//! [`AggregateRow`], compute the new mean, and store it back only if the row's
//! version is still the one they read.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use serde::Serialize;

use crate::models::{course, instructor};

/// An entity carrying a derived `avg_rating`/`feedback_count` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AggregateRoot {
    Course(i64),
    Instructor(i64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateRow {
    pub avg_rating: f64,
    pub feedback_count: i64,
    pub version: i64,
}

impl AggregateRoot {
    pub async fn load<C: ConnectionTrait>(self, db: &C) -> Result<Option<AggregateRow>, DbErr> {
        Ok(match self {
            AggregateRoot::Course(id) => course::Model::find(db, id).await?.map(|c| AggregateRow {
                avg_rating: c.avg_rating,
                feedback_count: c.feedback_count,
                version: c.version,
            }),
            AggregateRoot::Instructor(id) => {
                instructor::Model::find(db, id).await?.map(|i| AggregateRow {
                    avg_rating: i.avg_rating,
                    feedback_count: i.feedback_count,
                    version: i.version,
                })
            }
        })
    }

    /// Returns `false` if the row was modified after `expected_version` was read.
    pub async fn store<C: ConnectionTrait>(
        self,
        db: &C,
        expected_version: i64,
        avg_rating: f64,
        feedback_count: i64,
    ) -> Result<bool, DbErr> {
        match self {
            AggregateRoot::Course(id) => {
                course::Model::apply_aggregate(db, id, expected_version, avg_rating, feedback_count).await
            }
            AggregateRoot::Instructor(id) => {
                instructor::Model::apply_aggregate(db, id, expected_version, avg_rating, feedback_count)
                    .await
            }
        }
    }
}

/// Takes the database write lock for the surrounding transaction.
///
/// SQLite starts transactions deferred, so one that reads first and writes
/// later fails with "database is locked" when another connection wrote in
/// between. Issuing a write before any read makes the transaction wait for
/// the lock (up to the busy timeout) instead. The statement matches no rows.
pub async fn claim_write_lock<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    course::Entity::update_many()
        .col_expr(course::Column::Version, Expr::col(course::Column::Version).into())
        .filter(course::Column::Id.eq(-1))
        .exec(db)
        .await?;
    Ok(())
}
