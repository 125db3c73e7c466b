use async_trait::async_trait;
use chrono::{DateTime, Utc};
use db::models::submission_quota;
use sea_orm::DatabaseConnection;

use super::CounterStore;
use crate::error::AppError;
use crate::retry::retry_on_conflict;

const LOCKED_RETRIES: u32 = 3;

/// Counters kept in the `submission_quotas` table.
///
/// The increment is a single upsert statement, so concurrent submissions
/// from the same student serialize in the database. Each statement waits
/// out a locked database for the pool's busy timeout and is re-run if the
/// lock is still held after that.
pub struct DatabaseCounterStore {
    db: DatabaseConnection,
}

impl DatabaseCounterStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CounterStore for DatabaseCounterStore {
    async fn increment_with_expiry(&self, key: &str, expires_at: DateTime<Utc>) -> Result<u64, AppError> {
        let db = &self.db;
        let purged = retry_on_conflict(LOCKED_RETRIES, || async move {
            Ok::<_, AppError>(submission_quota::Model::purge_expired(db, Utc::now()).await?)
        })
        .await?;
        if purged > 0 {
            tracing::debug!(purged, "Removed expired quota counters");
        }
        let count = retry_on_conflict(LOCKED_RETRIES, || async move {
            Ok::<_, AppError>(submission_quota::Model::increment(db, key, expires_at).await?)
        })
        .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn read(&self, key: &str) -> Result<u64, AppError> {
        let count = submission_quota::Model::current(&self.db, key, Utc::now()).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
