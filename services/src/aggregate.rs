//! Incremental maintenance of the course and instructor rating means.
//!
//! The pure part ([`RatingAggregate`]) updates a running mean one rating at
//! a time. [`AggregateRatingUpdater`] applies such a change to a stored
//! aggregate row under an optimistic version check.

use db::aggregate::AggregateRoot;
use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::error::AppError;

/// A rating in the closed range `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Rating(i32);

impl Rating {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    pub fn new(value: i32) -> Result<Self, AppError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(AppError::BadRequest(format!(
                "Rating must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Rating {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

/// One contribution change to an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateChange {
    /// A record became visible.
    Add(Rating),
    /// A visible record was hidden or purged.
    Remove(Rating),
    /// A visible record's rating was edited in place.
    Replace { old: Rating, new: Rating },
}

/// `(avg_rating, feedback_count)` of one aggregate root.
///
/// Holds `feedback_count >= 0`, and `avg_rating == 0.0` whenever the count is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RatingAggregate {
    pub avg_rating: f64,
    pub feedback_count: i64,
}

impl RatingAggregate {
    pub const EMPTY: RatingAggregate = RatingAggregate { avg_rating: 0.0, feedback_count: 0 };

    pub fn new(avg_rating: f64, feedback_count: i64) -> Self {
        if feedback_count <= 0 {
            Self::EMPTY
        } else {
            Self { avg_rating, feedback_count }
        }
    }

    pub fn add(self, rating: Rating) -> Self {
        let n = self.feedback_count.max(0);
        let next = n + 1;
        let avg = (self.avg_rating * n as f64 + f64::from(rating.get())) / next as f64;
        Self::settled(avg, next)
    }

    pub fn remove(self, rating: Rating) -> Self {
        let n = self.feedback_count;
        let next = n - 1;
        if next <= 0 {
            return Self::EMPTY;
        }
        let avg = (self.avg_rating * n as f64 - f64::from(rating.get())) / next as f64;
        Self::settled(avg, next)
    }

    /// Swaps one contribution for another; the count is unchanged.
    pub fn replace(self, old: Rating, new: Rating) -> Self {
        let n = self.feedback_count;
        if n <= 0 {
            return Self::EMPTY;
        }
        let avg = (self.avg_rating * n as f64 - f64::from(old.get()) + f64::from(new.get())) / n as f64;
        Self::settled(avg, n)
    }

    pub fn apply(self, change: AggregateChange) -> Self {
        match change {
            AggregateChange::Add(r) => self.add(r),
            AggregateChange::Remove(r) => self.remove(r),
            AggregateChange::Replace { old, new } => self.replace(old, new),
        }
    }

    // The mean of ratings in 1..=5 can only leave that range through float error.
    fn settled(avg: f64, count: i64) -> Self {
        Self {
            avg_rating: avg.clamp(f64::from(Rating::MIN), f64::from(Rating::MAX)),
            feedback_count: count,
        }
    }
}

pub struct AggregateRatingUpdater;

impl AggregateRatingUpdater {
    /// Applies `change` to the stored aggregate of `root`.
    ///
    /// Fails with [`AppError::Conflict`] if another writer updated the row
    /// between the read and the write; the caller's transaction should then be
    /// rolled back and retried.
    pub async fn apply<C: ConnectionTrait>(
        db: &C,
        root: AggregateRoot,
        change: AggregateChange,
    ) -> Result<RatingAggregate, AppError> {
        let row = root
            .load(db)
            .await?
            .ok_or_else(|| AppError::NotFound(describe(root)))?;

        let next = RatingAggregate::new(row.avg_rating, row.feedback_count).apply(change);

        if !root
            .store(db, row.version, next.avg_rating, next.feedback_count)
            .await?
        {
            return Err(AppError::Conflict(describe(root)));
        }

        tracing::debug!(
            root = %describe(root),
            avg_rating = next.avg_rating,
            feedback_count = next.feedback_count,
            "Aggregate updated"
        );
        Ok(next)
    }
}

fn describe(root: AggregateRoot) -> String {
    match root {
        AggregateRoot::Course(id) => format!("Course {id}"),
        AggregateRoot::Instructor(id) => format!("Instructor {id}"),
    }
}
