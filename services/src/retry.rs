use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// Re-runs `op` while it fails with [`AppError::Conflict`], at most `max_retries` extra times.
///
/// Each retry waits a little longer than the previous one. Any other outcome
/// is returned immediately.
pub async fn retry_on_conflict<T, F, Fut>(max_retries: u32, mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Err(AppError::Conflict(what)) if attempt < max_retries => {
                attempt += 1;
                tracing::debug!(attempt, what = %what, "Aggregate update conflicted, retrying");
                tokio::time::sleep(Duration::from_millis(5 * u64::from(attempt))).await;
            }
            Err(AppError::Conflict(what)) => {
                tracing::warn!(attempts = attempt + 1, what = %what, "Giving up after repeated conflicts");
                return Err(AppError::Conflict(what));
            }
            other => return other,
        }
    }
}
