use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::CounterStore;
use crate::error::AppError;

/// In-process counters; for tests and single-node deployments.
#[derive(Default)]
pub struct MemoryCounterStore {
    counters: Mutex<HashMap<String, (u64, DateTime<Utc>)>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment_with_expiry(&self, key: &str, expires_at: DateTime<Utc>) -> Result<u64, AppError> {
        let now = Utc::now();
        let mut counters = self.counters.lock().await;
        counters.retain(|_, (_, exp)| *exp > now);
        let entry = counters.entry(key.to_owned()).or_insert((0, expires_at));
        entry.0 += 1;
        Ok(entry.0)
    }

    async fn read(&self, key: &str) -> Result<u64, AppError> {
        let now = Utc::now();
        let counters = self.counters.lock().await;
        Ok(counters
            .get(key)
            .filter(|(_, exp)| *exp > now)
            .map(|(count, _)| *count)
            .unwrap_or(0))
    }
}
