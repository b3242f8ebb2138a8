use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{
    Content, ContentId, ContentSummary, Genre, OttAvailability, PlatformStats, RatingDistribution,
    Review, UserId, UserRating,
};

/// Site-wide counters for the admin dashboard
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, sqlx::FromRow)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_content: i64,
    pub total_reviews: i64,
    pub pending_reviews: i64,
    pub approved_reviews: i64,
    pub total_reviewers: i64,
    pub total_creators: i64,
    pub pending_golden: i64,
}

/// Per-item engagement row of the golden dashboard
#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
pub struct ContentStats {
    pub id: ContentId,
    pub title: String,
    pub genre: Genre,
    pub total_ratings: i64,
    pub average_rating: f64,
    pub total_reviews: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoldenDashboard {
    pub content_stats: Vec<ContentStats>,
    /// Newest reviews site-wide, approved or not
    pub recent_reviews: Vec<Review>,
    pub platform_stats: Vec<PlatformStats>,
    pub total_content: i64,
    pub total_reviews: i64,
    pub average_rating_all: f64,
}

/// Rating breakdown of one item, for golden users
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContentAnalytics {
    pub content: Content,
    pub distribution: RatingDistribution,
    pub total_ratings: u64,
    pub average_rating: f64,
    /// Approved reviews, newest first
    pub reviews: Vec<Review>,
    pub total_reviews: usize,
    pub ott_availability: Vec<OttAvailability>,
    pub similar_content: Vec<ContentSummary>,
}

/// Landing page of a signed-in user
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserDashboard {
    pub user_id: UserId,
    pub is_reviewer: bool,
    pub watchlist: Vec<WatchlistEntry>,
    pub recent_ratings: Vec<UserRating>,
    /// The user's own reviews, including those awaiting moderation
    pub recent_reviews: Vec<Review>,
    pub recommendations: Vec<ContentSummary>,
}

/// Public catalog listing with the facets offered as filters
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BrowsePage {
    pub items: Vec<ContentSummary>,
    pub total: usize,
    pub genres: Vec<Genre>,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendingItem {
    #[serde(flatten)]
    pub summary: ContentSummary,
    pub is_new_release: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContentDetail {
    pub content: Content,
    pub average_rating: f64,
    pub rating_count: usize,
    /// The viewing user's own rating, if any
    pub user_rating: Option<i16>,
    pub in_watchlist: bool,
    pub similar_content: Vec<ContentSummary>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
pub struct WatchlistEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub summary: ContentSummary,
    pub added_at: DateTime<Utc>,
}

impl TrendingItem {
    pub fn new(summary: ContentSummary, today: NaiveDate) -> Self {
        use chrono::Datelike;
        let is_new_release = summary.release_date.year() == today.year();
        Self {
            summary,
            is_new_release,
        }
    }
}
