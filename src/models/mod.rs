pub mod content;
pub mod ott;
pub mod rating;
pub mod review;
pub mod stats;
pub mod user;

pub use content::{
    BrowseQuery, BrowseSort, Content, ContentId, ContentQuery, ContentSummary, ContentType, Genre,
    GenreCount, NewContent,
};
pub use ott::{OttAvailability, OttListing, OttPlatform, OttQuery, PlatformStats};
pub use rating::{Rating, RatingDistribution, RatingValue, UserRating, MAX_RATING, MIN_RATING};
pub use review::{ModerationAction, NewReview, Review, ReviewFilter, ReviewId};
pub use stats::{
    BrowsePage, ContentAnalytics, ContentDetail, ContentStats, DashboardStats, GoldenDashboard,
    TrendingItem, UserDashboard, WatchlistEntry,
};
pub use user::{
    GoldenApplication, GoldenFilter, GoldenProfile, Role, RoleProfile, User, UserId,
    VerificationStatus, Viewer,
};
