use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    db::{CatalogStore, GoldenStatusUpdate},
    error::{AppError, AppResult},
    models::{
        BrowseQuery, BrowseSort, Content, ContentId, ContentQuery, ContentStats, ContentSummary,
        DashboardStats, GenreCount, GoldenApplication, GoldenProfile, NewContent, NewReview,
        OttAvailability, OttListing, OttPlatform, OttQuery, PlatformStats, Rating, RatingValue,
        Review, ReviewFilter, ReviewId, Role, RoleProfile, User, UserId, UserRating,
        VerificationStatus, WatchlistEntry,
    },
    models::rating::mean_rating,
};

/// [`CatalogStore`] holding every table in process memory.
///
/// Used for local development and tests. Orderings match [`super::PgStore`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    content: BTreeMap<ContentId, Content>,
    ratings: BTreeMap<(UserId, ContentId), Rating>,
    reviews: BTreeMap<ReviewId, Review>,
    watchlist: BTreeMap<(UserId, ContentId), DateTime<Utc>>,
    reviewers: HashMap<UserId, bool>,
    creators: HashMap<UserId, bool>,
    golden: HashMap<UserId, GoldenProfile>,
    ott: BTreeMap<(ContentId, OttPlatform), OttAvailability>,
    next_user_id: UserId,
    next_content_id: ContentId,
    next_review_id: ReviewId,
    last_tick: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps so "newest first" orders are total
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_tick {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(next);
        next
    }

    fn values_for(&self, content_id: ContentId) -> Vec<i16> {
        self.ratings
            .values()
            .filter(|r| r.content_id == content_id)
            .map(|r| r.value)
            .collect()
    }

    fn summary(&self, content: &Content) -> ContentSummary {
        let values = self.values_for(content.id);
        ContentSummary {
            id: content.id,
            title: content.title.clone(),
            genre: content.genre,
            content_type: content.content_type,
            release_date: content.release_date,
            average_rating: mean_rating(&values),
            rating_count: values.len() as i64,
        }
    }

    fn summaries(&self) -> Vec<ContentSummary> {
        self.content.values().map(|c| self.summary(c)).collect()
    }
}

fn browse_cmp(
    sort: BrowseSort,
    (a, a_summary): &(&Content, ContentSummary),
    (b, b_summary): &(&Content, ContentSummary),
) -> Ordering {
    let primary = match sort {
        BrowseSort::Newest => b.created_at.cmp(&a.created_at),
        BrowseSort::Oldest => a.created_at.cmp(&b.created_at),
        BrowseSort::Title => a.title.cmp(&b.title),
        BrowseSort::TitleDesc => b.title.cmp(&a.title),
        BrowseSort::ReleaseDate => a.release_date.cmp(&b.release_date),
        BrowseSort::ReleaseDateDesc => b.release_date.cmp(&a.release_date),
        BrowseSort::TopRated => b_summary.average_rating.total_cmp(&a_summary.average_rating),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, username: &str) -> User {
        self.insert_user_with(username, false).await
    }

    /// Inserts a site-staff user
    pub async fn insert_admin(&self, username: &str) -> User {
        self.insert_user_with(username, true).await
    }

    async fn insert_user_with(&self, username: &str, is_staff: bool) -> User {
        let mut tables = self.inner.write().await;
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            is_staff,
            is_active: true,
            date_joined: tables.tick(),
        };
        tables.users.insert(user.id, user.clone());
        user
    }

    pub async fn insert_content(&self, new: NewContent) -> Content {
        let mut tables = self.inner.write().await;
        tables.next_content_id += 1;
        let content = Content {
            id: tables.next_content_id,
            title: new.title,
            description: new.description,
            genre: new.genre,
            language: new.language,
            content_type: new.content_type,
            release_date: new.release_date,
            duration: new.duration,
            director: new.director,
            cast_members: new.cast_members,
            poster_url: None,
            trailer_url: None,
            created_at: tables.tick(),
        };
        tables.content.insert(content.id, content.clone());
        content
    }

    /// Deletes an item together with its ratings, reviews and watchlist rows
    pub async fn remove_content(&self, content_id: ContentId) -> bool {
        let mut tables = self.inner.write().await;
        tables.ratings.retain(|(_, c), _| *c != content_id);
        tables.reviews.retain(|_, r| r.content_id != content_id);
        tables.watchlist.retain(|(_, c), _| *c != content_id);
        tables.ott.retain(|(c, _), _| *c != content_id);
        tables.content.remove(&content_id).is_some()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }

    async fn user_ratings(&self, user_id: UserId) -> AppResult<Vec<UserRating>> {
        let tables = self.inner.read().await;
        let mut ratings: Vec<UserRating> = tables
            .ratings
            .range((user_id, ContentId::MIN)..=(user_id, ContentId::MAX))
            .filter_map(|(_, rating)| {
                tables.content.get(&rating.content_id).map(|c| UserRating {
                    content_id: rating.content_id,
                    genre: c.genre,
                    value: rating.value,
                    rated_at: rating.rated_at,
                })
            })
            .collect();
        ratings.sort_by(|a, b| {
            b.rated_at
                .cmp(&a.rated_at)
                .then_with(|| a.content_id.cmp(&b.content_id))
        });
        Ok(ratings)
    }

    async fn user_rating_for(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> AppResult<Option<Rating>> {
        Ok(self
            .inner
            .read()
            .await
            .ratings
            .get(&(user_id, content_id))
            .cloned())
    }

    async fn upsert_rating(
        &self,
        user_id: UserId,
        content_id: ContentId,
        value: RatingValue,
    ) -> AppResult<Rating> {
        let mut tables = self.inner.write().await;
        let rating = Rating {
            user_id,
            content_id,
            value: value.get(),
            rated_at: tables.tick(),
        };
        tables.ratings.insert((user_id, content_id), rating.clone());
        Ok(rating)
    }

    async fn rating_values(&self, content_id: ContentId) -> AppResult<Vec<i16>> {
        Ok(self.inner.read().await.values_for(content_id))
    }

    async fn get_content(&self, content_id: ContentId) -> AppResult<Option<Content>> {
        Ok(self.inner.read().await.content.get(&content_id).cloned())
    }

    async fn ranked_content(&self, query: &ContentQuery) -> AppResult<Vec<ContentSummary>> {
        let tables = self.inner.read().await;
        let mut items: Vec<ContentSummary> = tables
            .summaries()
            .into_iter()
            .filter(|s| query.matches(s))
            .collect();
        items.sort_by(ContentSummary::rank_cmp);
        items.truncate(query.limit);
        Ok(items)
    }

    async fn newest_content(&self, limit: usize) -> AppResult<Vec<ContentSummary>> {
        let tables = self.inner.read().await;
        let mut items = tables.summaries();
        items.sort_by(|a, b| {
            b.release_date
                .cmp(&a.release_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        items.truncate(limit);
        Ok(items)
    }

    async fn genre_counts(&self, limit: usize) -> AppResult<Vec<GenreCount>> {
        let tables = self.inner.read().await;
        let mut counts: BTreeMap<_, i64> = BTreeMap::new();
        for content in tables.content.values() {
            *counts.entry(content.genre).or_default() += 1;
        }
        let mut counts: Vec<GenreCount> = counts
            .into_iter()
            .map(|(genre, count)| GenreCount { genre, count })
            .collect();
        // BTreeMap iteration already yields genre ascending; the sort is stable
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(limit);
        Ok(counts)
    }

    async fn browse_content(&self, query: &BrowseQuery) -> AppResult<Vec<ContentSummary>> {
        let tables = self.inner.read().await;
        let mut items: Vec<(&Content, ContentSummary)> = tables
            .content
            .values()
            .filter(|c| query.matches(c))
            .map(|c| (c, tables.summary(c)))
            .collect();
        items.sort_by(|a, b| browse_cmp(query.sort, a, b));
        Ok(items.into_iter().map(|(_, summary)| summary).collect())
    }

    async fn content_languages(&self) -> AppResult<Vec<String>> {
        let tables = self.inner.read().await;
        let languages: BTreeSet<&String> = tables.content.values().map(|c| &c.language).collect();
        Ok(languages.into_iter().cloned().collect())
    }

    async fn set_ott_availability(
        &self,
        content_id: ContentId,
        listing: &OttListing,
    ) -> AppResult<OttAvailability> {
        let mut tables = self.inner.write().await;
        let availability = OttAvailability {
            content_id,
            platform_name: listing.platform,
            watch_url: listing.watch_url.clone(),
            is_free: listing.is_free,
        };
        tables
            .ott
            .insert((content_id, listing.platform), availability.clone());
        Ok(availability)
    }

    async fn ott_for_content(&self, content_id: ContentId) -> AppResult<Vec<OttAvailability>> {
        let tables = self.inner.read().await;
        Ok(tables
            .ott
            .values()
            .filter(|o| o.content_id == content_id)
            .cloned()
            .collect())
    }

    async fn ott_browse(&self, query: &OttQuery) -> AppResult<Vec<ContentSummary>> {
        let tables = self.inner.read().await;
        let ids: BTreeSet<ContentId> = tables
            .ott
            .values()
            .filter(|o| query.accepts(o))
            .map(|o| o.content_id)
            .collect();
        Ok(ids
            .iter()
            .filter_map(|id| tables.content.get(id))
            .map(|c| tables.summary(c))
            .collect())
    }

    async fn platform_stats(&self) -> AppResult<Vec<PlatformStats>> {
        let tables = self.inner.read().await;
        let mut stats: BTreeMap<OttPlatform, PlatformStats> = BTreeMap::new();
        for row in tables.ott.values() {
            let entry = stats.entry(row.platform_name).or_insert(PlatformStats {
                platform_name: row.platform_name,
                total_content: 0,
                free_content: 0,
            });
            entry.total_content += 1;
            if row.is_free {
                entry.free_content += 1;
            }
        }
        let mut stats: Vec<PlatformStats> = stats.into_values().collect();
        stats.sort_by(|a, b| b.total_content.cmp(&a.total_content));
        Ok(stats)
    }

    async fn role_profile(&self, user_id: UserId) -> AppResult<RoleProfile> {
        let tables = self.inner.read().await;
        let Some(user) = tables.users.get(&user_id) else {
            return Ok(RoleProfile::default());
        };
        Ok(RoleProfile {
            is_staff: user.is_staff,
            reviewer_active: tables.reviewers.get(&user_id).copied(),
            creator_active: tables.creators.get(&user_id).copied(),
            golden_status: tables
                .golden
                .get(&user_id)
                .map(|g| g.verification_status),
        })
    }

    async fn grant_role(&self, user_id: UserId, role: Role) -> AppResult<()> {
        let mut tables = self.inner.write().await;
        match role {
            Role::Reviewer => tables.reviewers.insert(user_id, true),
            Role::ContentCreator => tables.creators.insert(user_id, true),
            other => {
                return Err(AppError::InvalidInput(format!(
                    "Role {:?} cannot be granted directly",
                    other
                )))
            }
        };
        Ok(())
    }

    async fn golden_profile(&self, user_id: UserId) -> AppResult<Option<GoldenProfile>> {
        Ok(self.inner.read().await.golden.get(&user_id).cloned())
    }

    async fn save_golden_application(
        &self,
        user_id: UserId,
        application: &GoldenApplication,
    ) -> AppResult<GoldenProfile> {
        let mut tables = self.inner.write().await;
        let profile = GoldenProfile {
            user_id,
            profession: application.profession.clone(),
            years_of_experience: application.years_of_experience,
            company: application.company.clone(),
            notable_works: application.notable_works.clone(),
            verification_status: VerificationStatus::Pending,
            verification_notes: None,
            verified_at: None,
            verified_by: None,
            total_content_views: tables
                .golden
                .get(&user_id)
                .map_or(0, |g| g.total_content_views),
            created_at: tables.tick(),
        };
        tables.golden.insert(user_id, profile.clone());
        Ok(profile)
    }

    async fn set_golden_status(
        &self,
        user_id: UserId,
        update: &GoldenStatusUpdate,
    ) -> AppResult<Option<GoldenProfile>> {
        let mut tables = self.inner.write().await;
        Ok(tables.golden.get_mut(&user_id).map(|profile| {
            profile.verification_status = update.status;
            profile.verification_notes = update.notes.clone();
            profile.verified_at = update.verified_at;
            profile.verified_by = update.verified_by;
            profile.clone()
        }))
    }

    async fn golden_profiles(&self) -> AppResult<Vec<GoldenProfile>> {
        let tables = self.inner.read().await;
        let mut profiles: Vec<GoldenProfile> = tables.golden.values().cloned().collect();
        profiles.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(profiles)
    }

    async fn increment_golden_views(&self, user_id: UserId) -> AppResult<bool> {
        let mut tables = self.inner.write().await;
        Ok(match tables.golden.get_mut(&user_id) {
            Some(profile) => {
                profile.total_content_views += 1;
                true
            }
            None => false,
        })
    }

    async fn insert_review(&self, review: &NewReview) -> AppResult<Review> {
        let mut tables = self.inner.write().await;
        tables.next_review_id += 1;
        let created = Review {
            id: tables.next_review_id,
            user_id: review.user_id,
            content_id: review.content_id,
            comment: review.comment.clone(),
            is_approved: review.is_approved,
            is_verified: review.is_verified,
            reviewed_at: tables.tick(),
        };
        tables.reviews.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_review(&self, review_id: ReviewId) -> AppResult<Option<Review>> {
        Ok(self.inner.read().await.reviews.get(&review_id).cloned())
    }

    async fn update_review(
        &self,
        review_id: ReviewId,
        comment: &str,
        is_approved: bool,
    ) -> AppResult<Option<Review>> {
        let mut tables = self.inner.write().await;
        Ok(tables.reviews.get_mut(&review_id).map(|review| {
            review.comment = comment.to_string();
            review.is_approved = is_approved;
            review.clone()
        }))
    }

    async fn set_review_approved(&self, review_id: ReviewId, approved: bool) -> AppResult<bool> {
        let mut tables = self.inner.write().await;
        Ok(match tables.reviews.get_mut(&review_id) {
            Some(review) => {
                review.is_approved = approved;
                true
            }
            None => false,
        })
    }

    async fn delete_review(&self, review_id: ReviewId) -> AppResult<bool> {
        Ok(self
            .inner
            .write()
            .await
            .reviews
            .remove(&review_id)
            .is_some())
    }

    async fn list_reviews(&self, filter: ReviewFilter) -> AppResult<Vec<Review>> {
        let tables = self.inner.read().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| filter.accepts(r))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.reviewed_at.cmp(&a.reviewed_at).then(b.id.cmp(&a.id)));
        Ok(reviews)
    }

    async fn approved_reviews(&self, content_id: ContentId) -> AppResult<Vec<Review>> {
        let mut reviews = self.list_reviews(ReviewFilter::Approved).await?;
        reviews.retain(|r| r.content_id == content_id);
        Ok(reviews)
    }

    async fn recent_reviews(&self, author: Option<UserId>, limit: usize) -> AppResult<Vec<Review>> {
        let mut reviews = self.list_reviews(ReviewFilter::All).await?;
        reviews.retain(|r| author.map_or(true, |a| r.user_id == a));
        reviews.truncate(limit);
        Ok(reviews)
    }

    async fn add_to_watchlist(&self, user_id: UserId, content_id: ContentId) -> AppResult<()> {
        let mut tables = self.inner.write().await;
        if !tables.watchlist.contains_key(&(user_id, content_id)) {
            let added_at = tables.tick();
            tables.watchlist.insert((user_id, content_id), added_at);
        }
        Ok(())
    }

    async fn remove_from_watchlist(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> AppResult<bool> {
        Ok(self
            .inner
            .write()
            .await
            .watchlist
            .remove(&(user_id, content_id))
            .is_some())
    }

    async fn in_watchlist(&self, user_id: UserId, content_id: ContentId) -> AppResult<bool> {
        Ok(self
            .inner
            .read()
            .await
            .watchlist
            .contains_key(&(user_id, content_id)))
    }

    async fn watchlist(&self, user_id: UserId) -> AppResult<Vec<WatchlistEntry>> {
        let tables = self.inner.read().await;
        let mut entries: Vec<WatchlistEntry> = tables
            .watchlist
            .range((user_id, ContentId::MIN)..=(user_id, ContentId::MAX))
            .filter_map(|((_, content_id), added_at)| {
                tables.content.get(content_id).map(|c| WatchlistEntry {
                    summary: tables.summary(c),
                    added_at: *added_at,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.added_at
                .cmp(&a.added_at)
                .then_with(|| a.summary.id.cmp(&b.summary.id))
        });
        Ok(entries)
    }

    async fn dashboard_counts(&self) -> AppResult<DashboardStats> {
        let tables = self.inner.read().await;
        let approved = tables.reviews.values().filter(|r| r.is_approved).count() as i64;
        let total_reviews = tables.reviews.len() as i64;
        Ok(DashboardStats {
            total_users: tables.users.len() as i64,
            total_content: tables.content.len() as i64,
            total_reviews,
            pending_reviews: total_reviews - approved,
            approved_reviews: approved,
            total_reviewers: tables.reviewers.len() as i64,
            total_creators: tables.creators.len() as i64,
            pending_golden: tables
                .golden
                .values()
                .filter(|g| g.verification_status == VerificationStatus::Pending)
                .count() as i64,
        })
    }

    async fn content_stats(&self, limit: usize) -> AppResult<Vec<ContentStats>> {
        let tables = self.inner.read().await;
        let mut stats: Vec<ContentStats> = tables
            .content
            .values()
            .map(|c| {
                let values = tables.values_for(c.id);
                ContentStats {
                    id: c.id,
                    title: c.title.clone(),
                    genre: c.genre,
                    total_ratings: values.len() as i64,
                    average_rating: mean_rating(&values),
                    total_reviews: tables
                        .reviews
                        .values()
                        .filter(|r| r.content_id == c.id)
                        .count() as i64,
                }
            })
            .collect();
        stats.sort_by(|a, b| {
            b.total_ratings
                .cmp(&a.total_ratings)
                .then_with(|| a.id.cmp(&b.id))
        });
        stats.truncate(limit);
        Ok(stats)
    }

    async fn overall_average_rating(&self) -> AppResult<f64> {
        let tables = self.inner.read().await;
        let values: Vec<i16> = tables.ratings.values().map(|r| r.value).collect();
        Ok(mean_rating(&values))
    }
}
