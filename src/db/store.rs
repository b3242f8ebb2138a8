use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppResult,
    models::{
        BrowseQuery, Content, ContentId, ContentQuery, ContentStats, ContentSummary,
        DashboardStats, GenreCount, GoldenApplication, GoldenProfile, NewReview, OttAvailability,
        OttListing, OttQuery, PlatformStats, Rating, RatingValue, Review, ReviewFilter, ReviewId,
        Role, RoleProfile, User, UserId, UserRating, VerificationStatus, WatchlistEntry,
    },
};

/// Fields written when an admin decides on a golden-user application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldenStatusUpdate {
    pub status: VerificationStatus,
    pub notes: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<UserId>,
}

/// Storage collaborator for the catalog, ratings and the surrounding site data.
///
/// Every read reflects committed state at call time; implementations hold no
/// cache. Ranked reads (`ranked_content`, `newest_content`) compute the
/// rating aggregate per call and order ties by content id ascending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// All ratings by a user, newest first
    async fn user_ratings(&self, user_id: UserId) -> AppResult<Vec<UserRating>>;

    async fn user_rating_for(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> AppResult<Option<Rating>>;

    /// Creates the rating or overwrites the existing value for the pair
    async fn upsert_rating(
        &self,
        user_id: UserId,
        content_id: ContentId,
        value: RatingValue,
    ) -> AppResult<Rating>;

    async fn rating_values(&self, content_id: ContentId) -> AppResult<Vec<i16>>;

    async fn get_content(&self, content_id: ContentId) -> AppResult<Option<Content>>;

    /// Catalog items matching `query`, ordered by [`ContentSummary::rank_cmp`]
    async fn ranked_content(&self, query: &ContentQuery) -> AppResult<Vec<ContentSummary>>;

    /// Most recently released items
    async fn newest_content(&self, limit: usize) -> AppResult<Vec<ContentSummary>>;

    async fn genre_counts(&self, limit: usize) -> AppResult<Vec<GenreCount>>;

    /// Every item matching `query`, in its sort order with ties on id ascending
    async fn browse_content(&self, query: &BrowseQuery) -> AppResult<Vec<ContentSummary>>;

    /// Distinct catalog languages, ascending
    async fn content_languages(&self) -> AppResult<Vec<String>>;

    /// Creates or replaces the item's row for `listing.platform`
    async fn set_ott_availability(
        &self,
        content_id: ContentId,
        listing: &OttListing,
    ) -> AppResult<OttAvailability>;

    async fn ott_for_content(&self, content_id: ContentId) -> AppResult<Vec<OttAvailability>>;

    /// Items with at least one availability row accepted by `query`, id ascending
    async fn ott_browse(&self, query: &OttQuery) -> AppResult<Vec<ContentSummary>>;

    /// Per-platform counts, largest catalog first
    async fn platform_stats(&self) -> AppResult<Vec<PlatformStats>>;

    async fn role_profile(&self, user_id: UserId) -> AppResult<RoleProfile>;

    /// Creates or reactivates a reviewer / content-creator record
    async fn grant_role(&self, user_id: UserId, role: Role) -> AppResult<()>;

    async fn golden_profile(&self, user_id: UserId) -> AppResult<Option<GoldenProfile>>;

    /// Stores a fresh pending application, replacing any previous one
    async fn save_golden_application(
        &self,
        user_id: UserId,
        application: &GoldenApplication,
    ) -> AppResult<GoldenProfile>;

    async fn set_golden_status(
        &self,
        user_id: UserId,
        update: &GoldenStatusUpdate,
    ) -> AppResult<Option<GoldenProfile>>;

    /// Every golden application, newest first
    async fn golden_profiles(&self) -> AppResult<Vec<GoldenProfile>>;

    /// Bumps the analytics view counter; false when the user has no golden record
    async fn increment_golden_views(&self, user_id: UserId) -> AppResult<bool>;

    async fn insert_review(&self, review: &NewReview) -> AppResult<Review>;

    async fn get_review(&self, review_id: ReviewId) -> AppResult<Option<Review>>;

    async fn update_review(
        &self,
        review_id: ReviewId,
        comment: &str,
        is_approved: bool,
    ) -> AppResult<Option<Review>>;

    async fn set_review_approved(&self, review_id: ReviewId, approved: bool) -> AppResult<bool>;

    async fn delete_review(&self, review_id: ReviewId) -> AppResult<bool>;

    /// Reviews in the moderation queue view, newest first
    async fn list_reviews(&self, filter: ReviewFilter) -> AppResult<Vec<Review>>;

    async fn approved_reviews(&self, content_id: ContentId) -> AppResult<Vec<Review>>;

    /// Newest reviews in any moderation state, optionally by one author
    async fn recent_reviews(&self, author: Option<UserId>, limit: usize) -> AppResult<Vec<Review>>;

    /// No-op when the item is already listed
    async fn add_to_watchlist(&self, user_id: UserId, content_id: ContentId) -> AppResult<()>;

    async fn remove_from_watchlist(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> AppResult<bool>;

    async fn in_watchlist(&self, user_id: UserId, content_id: ContentId) -> AppResult<bool>;

    async fn watchlist(&self, user_id: UserId) -> AppResult<Vec<WatchlistEntry>>;

    async fn dashboard_counts(&self) -> AppResult<DashboardStats>;

    /// Items with the most ratings first
    async fn content_stats(&self, limit: usize) -> AppResult<Vec<ContentStats>>;

    async fn overall_average_rating(&self) -> AppResult<f64>;
}
