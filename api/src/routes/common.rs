use db::models::feedback::{ListFilter, SortField, SortOrder};
use serde::Deserialize;
use services::analytics_service::TrendGrouping;
use services::pagination;

pub const DEFAULT_RECENT_DAYS: u32 = 7;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl PageQuery {
    pub fn normalize(&self) -> (u64, u64) {
        pagination::normalize(self.page, self.per_page)
    }
}

/// Query string of `GET /courses/{course_id}/feedbacks`.
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub sort: Option<SortField>,
    pub order: Option<SortOrder>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub anonymous: Option<bool>,
}

impl FeedbackListQuery {
    pub fn normalize(&self) -> (u64, u64) {
        pagination::normalize(self.page, self.per_page)
    }

    pub fn filter(&self) -> ListFilter {
        ListFilter {
            min_rating: self.min_rating,
            max_rating: self.max_rating,
            anonymous: self.anonymous,
            sort: self.sort.unwrap_or_default(),
            order: self.order.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendQuery {
    pub group_by: Option<TrendGrouping>,
}
