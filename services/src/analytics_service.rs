use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use db::models::{course, instructor};
use db::reports;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::aggregate::Rating;
use crate::error::AppError;
use crate::pagination::Page;
use crate::report_cache::{ReportCache, ReportKey};
use crate::window::window_start;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendGrouping {
    #[serde(alias = "DAY")]
    Day,
    #[default]
    #[serde(alias = "MONTH")]
    Month,
    #[serde(alias = "YEAR")]
    Year,
}

impl TrendGrouping {
    fn bucket(self, date: NaiveDate) -> String {
        let format = match self {
            TrendGrouping::Day => "%Y-%m-%d",
            TrendGrouping::Month => "%Y-%m",
            TrendGrouping::Year => "%Y",
        };
        date.format(format).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBucket {
    pub rating: i32,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseStanding {
    pub course_id: i64,
    pub course_name: String,
    pub avg_rating: f64,
    pub feedback_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructorStanding {
    pub instructor_id: i64,
    pub name: String,
    pub department: Option<String>,
    pub avg_rating: f64,
    pub feedback_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentAverage {
    pub days: u32,
    pub average: f64,
    pub samples: usize,
}

/// A computed analytics report as stored in the [`ReportCache`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Trends(Vec<TrendPoint>),
    Distribution(Vec<RatingBucket>),
    CourseRanking(Page<CourseStanding>),
    InstructorRanking(Page<InstructorStanding>),
    CourseSummary(Vec<CourseStanding>),
}

pub struct AnalyticsService {
    db: DatabaseConnection,
    cache: Arc<ReportCache>,
}

impl AnalyticsService {
    pub fn new(db: DatabaseConnection, cache: Arc<ReportCache>) -> Self {
        Self { db, cache }
    }

    /// Number of active feedbacks per day, month or year.
    pub async fn trends(&self, grouping: TrendGrouping) -> Result<Report, AppError> {
        self.cache
            .get_or_compute(ReportKey::Trends(grouping), || async {
                let dates = reports::submitted_dates(&self.db).await?;
                let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
                for date in dates {
                    *buckets.entry(grouping.bucket(date)).or_default() += 1;
                }
                Ok(Report::Trends(
                    buckets
                        .into_iter()
                        .map(|(period, count)| TrendPoint { period, count })
                        .collect(),
                ))
            })
            .await
    }

    /// How often each course rating was given.
    pub async fn rating_distribution(&self) -> Result<Report, AppError> {
        self.cache
            .get_or_compute(ReportKey::RatingDistribution, || async {
                let counts = reports::course_rating_counts(&self.db).await?;
                Ok(Report::Distribution(distribution(counts)))
            })
            .await
    }

    /// How often each instructor rating was given to one instructor.
    pub async fn instructor_distribution(&self, instructor_id: i64) -> Result<Report, AppError> {
        if instructor::Model::find(&self.db, instructor_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Instructor {instructor_id}")));
        }
        self.cache
            .get_or_compute(ReportKey::InstructorDistribution(instructor_id), || async {
                let counts = reports::instructor_rating_counts(&self.db, instructor_id).await?;
                Ok(Report::Distribution(distribution(counts)))
            })
            .await
    }

    pub async fn course_ranking(&self, page: u64, per_page: u64) -> Result<Report, AppError> {
        self.cache
            .get_or_compute(ReportKey::CourseRanking { page, per_page }, || async {
                let (rows, total) = course::Model::ranked(&self.db, page, per_page).await?;
                Ok(Report::CourseRanking(Page {
                    items: rows.into_iter().map(course_standing).collect(),
                    page,
                    per_page,
                    total,
                }))
            })
            .await
    }

    pub async fn instructor_ranking(&self, page: u64, per_page: u64) -> Result<Report, AppError> {
        self.cache
            .get_or_compute(ReportKey::InstructorRanking { page, per_page }, || async {
                let (rows, total) = instructor::Model::ranked(&self.db, page, per_page).await?;
                Ok(Report::InstructorRanking(Page {
                    items: rows
                        .into_iter()
                        .map(|i| InstructorStanding {
                            instructor_id: i.id,
                            name: i.name,
                            department: i.department,
                            avg_rating: i.avg_rating,
                            feedback_count: i.feedback_count,
                        })
                        .collect(),
                    page,
                    per_page,
                    total,
                }))
            })
            .await
    }

    /// Current aggregate of every course, alphabetically.
    pub async fn course_summary(&self) -> Result<Report, AppError> {
        self.cache
            .get_or_compute(ReportKey::CourseSummary, || async {
                let rows = course::Model::all_by_name(&self.db).await?;
                Ok(Report::CourseSummary(rows.into_iter().map(course_standing).collect()))
            })
            .await
    }

    /// Mean course rating over the last `days` days. Not cached.
    pub async fn recent_course_average(&self, days: u32) -> Result<RecentAverage, AppError> {
        let rows = reports::ratings_since(&self.db, since(days)?).await?;
        Ok(recent_average(days, rows.iter().map(|(course, _)| *course)))
    }

    /// Mean instructor rating over the last `days` days. Not cached.
    pub async fn recent_instructor_average(&self, days: u32) -> Result<RecentAverage, AppError> {
        let rows = reports::ratings_since(&self.db, since(days)?).await?;
        Ok(recent_average(days, rows.iter().map(|(_, instructor)| *instructor)))
    }
}

fn since(days: u32) -> Result<NaiveDate, AppError> {
    window_start(Local::now().date_naive(), days)
}

fn course_standing(c: course::Model) -> CourseStanding {
    CourseStanding {
        course_id: c.id,
        course_name: c.name,
        avg_rating: c.avg_rating,
        feedback_count: c.feedback_count,
    }
}

fn distribution(counts: Vec<(i32, i64)>) -> Vec<RatingBucket> {
    let total: i64 = counts.iter().map(|(_, n)| n).sum();
    let by_rating: BTreeMap<i32, i64> = counts.into_iter().collect();
    (Rating::MIN..=Rating::MAX)
        .map(|rating| {
            let count = by_rating.get(&rating).copied().unwrap_or(0);
            let percentage = if total == 0 {
                0.0
            } else {
                (count as f64 * 10_000.0 / total as f64).round() / 100.0
            };
            RatingBucket { rating, count, percentage }
        })
        .collect()
}

fn recent_average(days: u32, ratings: impl Iterator<Item = i32>) -> RecentAverage {
    let (sum, samples) = ratings.fold((0i64, 0usize), |(s, n), r| (s + i64::from(r), n + 1));
    let average = if samples == 0 { 0.0 } else { sum as f64 / samples as f64 };
    RecentAverage { days, average, samples }
}
