//! Day windows that end today, used by the "last N days" reads.

use chrono::{Days, NaiveDate};

use crate::error::AppError;

pub const MAX_WINDOW_DAYS: u32 = 366;

/// First day of a window of `days` days ending on `today`, which it includes.
pub fn window_start(today: NaiveDate, days: u32) -> Result<NaiveDate, AppError> {
    if !(1..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(AppError::BadRequest(format!(
            "days must be between 1 and {MAX_WINDOW_DAYS}"
        )));
    }
    today
        .checked_sub_days(Days::new(u64::from(days - 1)))
        .ok_or_else(|| AppError::BadRequest(format!("A {days} day window is out of range")))
}
