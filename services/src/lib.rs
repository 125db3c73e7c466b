pub mod actor;
pub mod aggregate;
pub mod analytics_service;
pub mod eligibility;
pub mod error;
pub mod feedback_service;
pub mod pagination;
pub mod quota;
pub mod report_cache;
pub mod retry;
pub mod window;

pub use actor::Actor;
pub use error::{AppError, RateLimitInfo};
