//! Cache for the read-only analytics reports.
//!
//! Each report has its own [`ReportKey`]. Concurrent readers of a missing
//! report share a single computation. The lifecycle manager calls
//! [`ReportCache::invalidate`] after every committed mutation.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use db::aggregate::AggregateRoot;
use tokio::sync::{Mutex, OnceCell};

use crate::analytics_service::{Report, TrendGrouping};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReportKey {
    Trends(TrendGrouping),
    RatingDistribution,
    CourseRanking { page: u64, per_page: u64 },
    InstructorRanking { page: u64, per_page: u64 },
    InstructorDistribution(i64),
    CourseSummary,
}

#[derive(Default)]
pub struct ReportCache {
    entries: Mutex<HashMap<ReportKey, Arc<OnceCell<Report>>>>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached report for `key`, computing it once if absent.
    ///
    /// A failed computation leaves nothing behind, so the next caller tries again.
    pub async fn get_or_compute<F, Fut>(&self, key: ReportKey, compute: F) -> Result<Report, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Report, AppError>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(key).or_default().clone()
        };
        let report = cell.get_or_try_init(compute).await?;
        Ok(report.clone())
    }

    /// Drops every report that may depend on the given aggregates.
    ///
    /// Global reports always go; per-instructor reports only for the
    /// instructors in `roots`. A computation still running on an evicted
    /// entry finishes into the detached cell and never reaches the map.
    pub async fn invalidate(&self, roots: &[AggregateRoot]) {
        let touched: HashSet<i64> = roots
            .iter()
            .filter_map(|root| match root {
                AggregateRoot::Instructor(id) => Some(*id),
                AggregateRoot::Course(_) => None,
            })
            .collect();

        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| match key {
            ReportKey::InstructorDistribution(id) => !touched.contains(id),
            _ => false,
        });
        tracing::debug!(evicted = before - entries.len(), "Report cache invalidated");
    }

    pub async fn contains(&self, key: &ReportKey) -> bool {
        self.entries
            .lock()
            .await
            .get(key)
            .is_some_and(|cell| cell.initialized())
    }
}
