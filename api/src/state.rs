use std::sync::Arc;

use sea_orm::DatabaseConnection;
use services::analytics_service::AnalyticsService;
use services::feedback_service::FeedbackLifecycleManager;
use services::quota::{CounterStore, QuotaTracker};
use services::report_cache::ReportCache;
use util::config;

/// Shared handles for every request: the database plus the two services
/// built on top of it. Both services share one report cache, so mutations
/// made through the lifecycle manager invalidate what analytics serves.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    feedback: Arc<FeedbackLifecycleManager>,
    analytics: Arc<AnalyticsService>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, counters: Arc<dyn CounterStore>) -> Self {
        let cache = Arc::new(ReportCache::new());
        let quota = QuotaTracker::new(counters, config::daily_feedback_limit());
        let feedback = FeedbackLifecycleManager::new(
            db.clone(),
            quota,
            cache.clone(),
            config::aggregate_max_retries(),
        );
        let analytics = AnalyticsService::new(db.clone(), cache);

        Self {
            db,
            feedback: Arc::new(feedback),
            analytics: Arc::new(analytics),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn feedback(&self) -> &FeedbackLifecycleManager {
        &self.feedback
    }

    pub fn analytics(&self) -> &AnalyticsService {
        &self.analytics
    }
}
