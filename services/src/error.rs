use chrono::{DateTime, Local};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

/// Quota state reported to clients on every submission attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Local>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    RoleViolation(String),

    #[error("Student {student_id} is not enrolled in course {course_id}")]
    NotEnrolled { student_id: i64, course_id: i64 },

    #[error("{0}")]
    Forbidden(String),

    #[error("Daily feedback limit of {} reached, resets at {}", .0.limit, .0.reset_at.to_rfc3339())]
    QuotaExceeded(RateLimitInfo),

    #[error("{0}")]
    BadRequest(String),

    /// Lost an optimistic-concurrency race on an aggregate row.
    #[error("Concurrent update on {0}, please retry")]
    Conflict(String),

    #[error("Quota store unavailable: {0}")]
    QuotaStore(String),

    #[error("Database error: {0}")]
    Database(DbErr),
}

impl AppError {
    /// Stable machine-readable category used in error bodies.
    pub fn category(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::RoleViolation(_) => "ROLE_VIOLATION",
            AppError::NotEnrolled { .. } => "NOT_ENROLLED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::QuotaExceeded(_) => "RATE_LIMIT_EXCEEDED",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Conflict(_) => "CONCURRENT_UPDATE",
            AppError::QuotaStore(_) => "QUOTA_STORE_UNAVAILABLE",
            AppError::Database(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return AppError::BadRequest(format!("Duplicate value: {detail}"));
        }
        let text = err.to_string();
        // SQLite reports writer contention this way; treat it like a version conflict.
        if text.contains("database is locked") || text.contains("database table is locked") {
            return AppError::Conflict("database".into());
        }
        AppError::Database(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        AppError::BadRequest(messages.join("; "))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::QuotaStore(err.to_string())
    }
}

impl From<bb8::RunError<redis::RedisError>> for AppError {
    fn from(err: bb8::RunError<redis::RedisError>) -> Self {
        match err {
            bb8::RunError::User(err) => AppError::QuotaStore(err.to_string()),
            bb8::RunError::TimedOut => AppError::QuotaStore("Redis connection timed out".into()),
        }
    }
}
