//! Per-student daily submission quota.
//!
//! Each student gets one counter per calendar day (server local time), keyed
//! `feedback:rate:{student_id}:today:{YYYYMMDD}`. The counter expires at the
//! next local midnight, so the window is a calendar day rather than a rolling
//! 24 hours. Counting happens in a [`CounterStore`], which must increment and
//! read in one atomic step.

mod database;
mod memory;
mod redis_store;

pub use database::DatabaseCounterStore;
pub use memory::MemoryCounterStore;
pub use redis_store::{RedisCounterStore, RedisPool};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{AppError, RateLimitInfo};

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increments `key` and returns the new count.
    ///
    /// A key that does not exist yet starts at zero and expires at `expires_at`.
    async fn increment_with_expiry(&self, key: &str, expires_at: DateTime<Utc>) -> Result<u64, AppError>;

    /// Current count of `key`, zero if it is missing or expired.
    async fn read(&self, key: &str) -> Result<u64, AppError>;
}

pub fn quota_key(student_id: i64, day: NaiveDate) -> String {
    format!("feedback:rate:{}:today:{}", student_id, day.format("%Y%m%d"))
}

/// The first instant of the local day after `now`.
pub fn next_midnight(now: DateTime<Local>) -> DateTime<Local> {
    start_of_next_day(now)
}

/// Start of the day after `now` in its own zone.
///
/// When a DST jump skips midnight the day starts at the first wall-clock
/// time that exists, which is always later than `now`.
fn start_of_next_day<Tz: TimeZone>(now: DateTime<Tz>) -> DateTime<Tz> {
    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return now + Duration::days(1);
    };
    let zone = now.timezone();
    let mut wall = tomorrow.and_time(NaiveTime::MIN);
    // Real gaps are at most a couple of hours.
    for _ in 0..=16 {
        if let Some(start) = zone.from_local_datetime(&wall).earliest() {
            return start;
        }
        wall += Duration::minutes(15);
    }
    now + Duration::days(1)
}

#[derive(Clone)]
pub struct QuotaTracker {
    store: Arc<dyn CounterStore>,
    daily_limit: u32,
}

impl QuotaTracker {
    pub fn new(store: Arc<dyn CounterStore>, daily_limit: u32) -> Self {
        Self { store, daily_limit }
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    pub async fn check_and_consume(&self, student_id: i64) -> Result<RateLimitInfo, AppError> {
        self.check_and_consume_at(student_id, Local::now()).await
    }

    /// Counts one submission attempt for `student_id` on the day of `now`.
    ///
    /// Fails with [`AppError::QuotaExceeded`] once the count passes the daily
    /// limit. Rejected attempts still count.
    pub async fn check_and_consume_at(
        &self,
        student_id: i64,
        now: DateTime<Local>,
    ) -> Result<RateLimitInfo, AppError> {
        let key = quota_key(student_id, now.date_naive());
        let reset_at = next_midnight(now);
        let count = self
            .store
            .increment_with_expiry(&key, reset_at.with_timezone(&Utc))
            .await?;

        let info = self.info(count, reset_at);
        if count > u64::from(self.daily_limit) {
            tracing::warn!(
                event = "RATE_LIMITED",
                student_id,
                count,
                limit = self.daily_limit,
                "Daily feedback limit exceeded"
            );
            return Err(AppError::QuotaExceeded(info));
        }
        Ok(info)
    }

    /// Reports today's usage without consuming anything.
    pub async fn peek(&self, student_id: i64) -> Result<RateLimitInfo, AppError> {
        let now = Local::now();
        let count = self.store.read(&quota_key(student_id, now.date_naive())).await?;
        Ok(self.info(count, next_midnight(now)))
    }

    fn info(&self, count: u64, reset_at: DateTime<Local>) -> RateLimitInfo {
        let remaining = u64::from(self.daily_limit).saturating_sub(count);
        RateLimitInfo {
            limit: self.daily_limit,
            remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
            reset_at,
        }
    }
}
