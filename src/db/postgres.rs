use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{CatalogStore, GoldenStatusUpdate},
    error::{AppError, AppResult},
    models::{
        BrowseQuery, BrowseSort, Content, ContentId, ContentQuery, ContentStats, ContentSummary,
        DashboardStats, GenreCount, GoldenApplication, GoldenProfile, NewReview, OttAvailability,
        OttListing, OttQuery, PlatformStats, Rating, RatingValue, Review, ReviewFilter, ReviewId,
        Role, RoleProfile, User, UserId, UserRating, WatchlistEntry,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the bundled migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const SUMMARY_COLUMNS: &str = r#"
    c.id, c.title, c.genre, c.content_type, c.release_date,
    COALESCE(AVG(r.value)::float8, 0) AS average_rating,
    COUNT(r.value) AS rating_count
"#;

const CONTENT_COLUMNS: &str = r#"
    id, title, description, genre, language, content_type, release_date,
    duration, director, cast_members, poster_url, trailer_url, created_at
"#;

const REVIEW_COLUMNS: &str =
    "id, user_id, content_id, comment, is_approved, is_verified, reviewed_at";

const GOLDEN_COLUMNS: &str = r#"
    user_id, profession, years_of_experience, company, notable_works,
    verification_status, verification_notes, verified_at, verified_by,
    total_content_views, created_at
"#;

const OTT_COLUMNS: &str = "content_id, platform_name, watch_url, is_free";

fn browse_order(sort: BrowseSort) -> &'static str {
    match sort {
        BrowseSort::Newest => "c.created_at DESC, c.id ASC",
        BrowseSort::Oldest => "c.created_at ASC, c.id ASC",
        BrowseSort::Title => "c.title ASC, c.id ASC",
        BrowseSort::TitleDesc => "c.title DESC, c.id ASC",
        BrowseSort::ReleaseDate => "c.release_date ASC, c.id ASC",
        BrowseSort::ReleaseDateDesc => "c.release_date DESC, c.id ASC",
        BrowseSort::TopRated => "average_rating DESC, c.id ASC",
    }
}

/// ILIKE pattern matching `term` anywhere, with wildcards in `term` escaped
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// [`CatalogStore`] backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, is_staff, is_active, date_joined
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn user_ratings(&self, user_id: UserId) -> AppResult<Vec<UserRating>> {
        let ratings = sqlx::query_as::<_, UserRating>(
            r#"
            SELECT r.content_id, c.genre, r.value, r.rated_at
            FROM ratings r
            JOIN content c ON c.id = r.content_id
            WHERE r.user_id = $1
            ORDER BY r.rated_at DESC, r.content_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    async fn user_rating_for(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> AppResult<Option<Rating>> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            SELECT user_id, content_id, value, rated_at
            FROM ratings
            WHERE user_id = $1 AND content_id = $2
            "#,
        )
        .bind(user_id)
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rating)
    }

    async fn upsert_rating(
        &self,
        user_id: UserId,
        content_id: ContentId,
        value: RatingValue,
    ) -> AppResult<Rating> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (user_id, content_id, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, content_id)
            DO UPDATE SET value = EXCLUDED.value, rated_at = NOW()
            RETURNING user_id, content_id, value, rated_at
            "#,
        )
        .bind(user_id)
        .bind(content_id)
        .bind(value.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(rating)
    }

    async fn rating_values(&self, content_id: ContentId) -> AppResult<Vec<i16>> {
        let values = sqlx::query_scalar::<_, i16>(
            "SELECT value FROM ratings WHERE content_id = $1 ORDER BY rated_at ASC, user_id ASC",
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(values)
    }

    async fn get_content(&self, content_id: ContentId) -> AppResult<Option<Content>> {
        let content = sqlx::query_as::<_, Content>(&format!(
            "SELECT {} FROM content WHERE id = $1",
            CONTENT_COLUMNS
        ))
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(content)
    }

    async fn ranked_content(&self, query: &ContentQuery) -> AppResult<Vec<ContentSummary>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM content c
            LEFT JOIN ratings r ON r.content_id = c.id
            WHERE ($1::genre IS NULL OR c.genre = $1)
              AND NOT (c.id = ANY($2))
            GROUP BY c.id
            ORDER BY average_rating DESC, c.id ASC
            LIMIT $3
            "#,
            SUMMARY_COLUMNS
        );

        let items = sqlx::query_as::<_, ContentSummary>(&sql)
            .bind(query.genre)
            .bind(&query.exclude[..])
            .bind(query.limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    async fn newest_content(&self, limit: usize) -> AppResult<Vec<ContentSummary>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM content c
            LEFT JOIN ratings r ON r.content_id = c.id
            GROUP BY c.id
            ORDER BY c.release_date DESC, c.id ASC
            LIMIT $1
            "#,
            SUMMARY_COLUMNS
        );

        let items = sqlx::query_as::<_, ContentSummary>(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    async fn genre_counts(&self, limit: usize) -> AppResult<Vec<GenreCount>> {
        let counts = sqlx::query_as::<_, GenreCount>(
            r#"
            SELECT genre, COUNT(*) AS count
            FROM content
            GROUP BY genre
            ORDER BY count DESC, genre ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    async fn browse_content(&self, query: &BrowseQuery) -> AppResult<Vec<ContentSummary>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM content c
            LEFT JOIN ratings r ON r.content_id = c.id
            WHERE ($1::genre IS NULL OR c.genre = $1)
              AND ($2::text IS NULL OR c.language = $2)
              AND ($3::content_type IS NULL OR c.content_type = $3)
              AND ($4::text IS NULL
                   OR c.title ILIKE $4
                   OR c.description ILIKE $4
                   OR c.director ILIKE $4
                   OR c.cast_members ILIKE $4)
            GROUP BY c.id
            ORDER BY {}
            "#,
            SUMMARY_COLUMNS,
            browse_order(query.sort)
        );

        let items = sqlx::query_as::<_, ContentSummary>(&sql)
            .bind(query.genre)
            .bind(&query.language)
            .bind(query.content_type)
            .bind(query.search.as_deref().map(contains_pattern))
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    async fn content_languages(&self) -> AppResult<Vec<String>> {
        let languages = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT language FROM content ORDER BY language ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(languages)
    }

    async fn set_ott_availability(
        &self,
        content_id: ContentId,
        listing: &OttListing,
    ) -> AppResult<OttAvailability> {
        let sql = format!(
            r#"
            INSERT INTO content_ott (content_id, platform_name, watch_url, is_free)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (content_id, platform_name)
            DO UPDATE SET watch_url = EXCLUDED.watch_url, is_free = EXCLUDED.is_free
            RETURNING {}
            "#,
            OTT_COLUMNS
        );

        let availability = sqlx::query_as::<_, OttAvailability>(&sql)
            .bind(content_id)
            .bind(listing.platform)
            .bind(&listing.watch_url)
            .bind(listing.is_free)
            .fetch_one(&self.pool)
            .await?;

        Ok(availability)
    }

    async fn ott_for_content(&self, content_id: ContentId) -> AppResult<Vec<OttAvailability>> {
        let rows = sqlx::query_as::<_, OttAvailability>(&format!(
            "SELECT {} FROM content_ott WHERE content_id = $1 ORDER BY platform_name ASC",
            OTT_COLUMNS
        ))
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn ott_browse(&self, query: &OttQuery) -> AppResult<Vec<ContentSummary>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM content c
            LEFT JOIN ratings r ON r.content_id = c.id
            WHERE EXISTS (
                SELECT 1 FROM content_ott o
                WHERE o.content_id = c.id
                  AND ($1::ott_platform IS NULL OR o.platform_name = $1)
                  AND (NOT $2 OR o.is_free)
            )
            GROUP BY c.id
            ORDER BY c.id ASC
            "#,
            SUMMARY_COLUMNS
        );

        let items = sqlx::query_as::<_, ContentSummary>(&sql)
            .bind(query.platform)
            .bind(query.free_only)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    async fn platform_stats(&self) -> AppResult<Vec<PlatformStats>> {
        let stats = sqlx::query_as::<_, PlatformStats>(
            r#"
            SELECT platform_name,
                   COUNT(*) AS total_content,
                   COUNT(*) FILTER (WHERE is_free) AS free_content
            FROM content_ott
            GROUP BY platform_name
            ORDER BY total_content DESC, platform_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn role_profile(&self, user_id: UserId) -> AppResult<RoleProfile> {
        let profile = sqlx::query_as::<_, RoleProfile>(
            r#"
            SELECT u.is_staff,
                   rv.is_active AS reviewer_active,
                   cc.is_active AS creator_active,
                   g.verification_status AS golden_status
            FROM users u
            LEFT JOIN reviewers rv ON rv.user_id = u.id
            LEFT JOIN content_creators cc ON cc.user_id = u.id
            LEFT JOIN golden_users g ON g.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile.unwrap_or_default())
    }

    async fn grant_role(&self, user_id: UserId, role: Role) -> AppResult<()> {
        let sql = match role {
            Role::Reviewer => {
                r#"
                INSERT INTO reviewers (user_id) VALUES ($1)
                ON CONFLICT (user_id) DO UPDATE SET is_active = true, verified_at = NOW()
                "#
            }
            Role::ContentCreator => {
                r#"
                INSERT INTO content_creators (user_id) VALUES ($1)
                ON CONFLICT (user_id) DO UPDATE SET is_active = true, verified_at = NOW()
                "#
            }
            other => {
                return Err(AppError::InvalidInput(format!(
                    "Role {:?} cannot be granted directly",
                    other
                )))
            }
        };

        sqlx::query(sql).bind(user_id).execute(&self.pool).await?;

        Ok(())
    }

    async fn golden_profile(&self, user_id: UserId) -> AppResult<Option<GoldenProfile>> {
        let profile = sqlx::query_as::<_, GoldenProfile>(&format!(
            "SELECT {} FROM golden_users WHERE user_id = $1",
            GOLDEN_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn save_golden_application(
        &self,
        user_id: UserId,
        application: &GoldenApplication,
    ) -> AppResult<GoldenProfile> {
        let sql = format!(
            r#"
            INSERT INTO golden_users (user_id, profession, years_of_experience, company, notable_works)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                profession = EXCLUDED.profession,
                years_of_experience = EXCLUDED.years_of_experience,
                company = EXCLUDED.company,
                notable_works = EXCLUDED.notable_works,
                verification_status = 'Pending',
                verification_notes = NULL,
                verified_at = NULL,
                verified_by = NULL,
                created_at = NOW()
            RETURNING {}
            "#,
            GOLDEN_COLUMNS
        );

        let profile = sqlx::query_as::<_, GoldenProfile>(&sql)
            .bind(user_id)
            .bind(&application.profession)
            .bind(application.years_of_experience)
            .bind(&application.company)
            .bind(&application.notable_works)
            .fetch_one(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn set_golden_status(
        &self,
        user_id: UserId,
        update: &GoldenStatusUpdate,
    ) -> AppResult<Option<GoldenProfile>> {
        let sql = format!(
            r#"
            UPDATE golden_users
            SET verification_status = $2,
                verification_notes = $3,
                verified_at = $4,
                verified_by = $5
            WHERE user_id = $1
            RETURNING {}
            "#,
            GOLDEN_COLUMNS
        );

        let profile = sqlx::query_as::<_, GoldenProfile>(&sql)
            .bind(user_id)
            .bind(update.status)
            .bind(&update.notes)
            .bind(update.verified_at)
            .bind(update.verified_by)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn golden_profiles(&self) -> AppResult<Vec<GoldenProfile>> {
        let profiles = sqlx::query_as::<_, GoldenProfile>(&format!(
            "SELECT {} FROM golden_users ORDER BY created_at DESC, user_id ASC",
            GOLDEN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    async fn increment_golden_views(&self, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE golden_users SET total_content_views = total_content_views + 1 WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_review(&self, review: &NewReview) -> AppResult<Review> {
        let sql = format!(
            r#"
            INSERT INTO reviews (user_id, content_id, comment, is_approved, is_verified)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        );

        let created = sqlx::query_as::<_, Review>(&sql)
            .bind(review.user_id)
            .bind(review.content_id)
            .bind(&review.comment)
            .bind(review.is_approved)
            .bind(review.is_verified)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn get_review(&self, review_id: ReviewId) -> AppResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn update_review(
        &self,
        review_id: ReviewId,
        comment: &str,
        is_approved: bool,
    ) -> AppResult<Option<Review>> {
        let sql = format!(
            "UPDATE reviews SET comment = $2, is_approved = $3 WHERE id = $1 RETURNING {}",
            REVIEW_COLUMNS
        );

        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(review_id)
            .bind(comment)
            .bind(is_approved)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }

    async fn set_review_approved(&self, review_id: ReviewId, approved: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE reviews SET is_approved = $2 WHERE id = $1")
            .bind(review_id)
            .bind(approved)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_review(&self, review_id: ReviewId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_reviews(&self, filter: ReviewFilter) -> AppResult<Vec<Review>> {
        let condition = match filter {
            ReviewFilter::Pending => "WHERE NOT is_approved",
            ReviewFilter::Approved => "WHERE is_approved",
            ReviewFilter::All => "",
        };

        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews {} ORDER BY reviewed_at DESC, id DESC",
            REVIEW_COLUMNS, condition
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn approved_reviews(&self, content_id: ContentId) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {}
            FROM reviews
            WHERE content_id = $1 AND is_approved
            ORDER BY reviewed_at DESC, id DESC
            "#,
            REVIEW_COLUMNS
        ))
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn recent_reviews(&self, author: Option<UserId>, limit: usize) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {}
            FROM reviews
            WHERE ($1::bigint IS NULL OR user_id = $1)
            ORDER BY reviewed_at DESC, id DESC
            LIMIT $2
            "#,
            REVIEW_COLUMNS
        ))
        .bind(author)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn add_to_watchlist(&self, user_id: UserId, content_id: ContentId) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO watchlist (user_id, content_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, content_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(content_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_from_watchlist(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM watchlist WHERE user_id = $1 AND content_id = $2")
            .bind(user_id)
            .bind(content_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn in_watchlist(&self, user_id: UserId, content_id: ContentId) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM watchlist WHERE user_id = $1 AND content_id = $2)",
        )
        .bind(user_id)
        .bind(content_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn watchlist(&self, user_id: UserId) -> AppResult<Vec<WatchlistEntry>> {
        let sql = format!(
            r#"
            SELECT {}, w.added_at
            FROM watchlist w
            JOIN content c ON c.id = w.content_id
            LEFT JOIN ratings r ON r.content_id = c.id
            WHERE w.user_id = $1
            GROUP BY c.id, w.added_at
            ORDER BY w.added_at DESC, c.id ASC
            "#,
            SUMMARY_COLUMNS
        );

        let entries = sqlx::query_as::<_, WatchlistEntry>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    async fn dashboard_counts(&self) -> AppResult<DashboardStats> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM content) AS total_content,
                (SELECT COUNT(*) FROM reviews) AS total_reviews,
                (SELECT COUNT(*) FROM reviews WHERE NOT is_approved) AS pending_reviews,
                (SELECT COUNT(*) FROM reviews WHERE is_approved) AS approved_reviews,
                (SELECT COUNT(*) FROM reviewers) AS total_reviewers,
                (SELECT COUNT(*) FROM content_creators) AS total_creators,
                (SELECT COUNT(*) FROM golden_users WHERE verification_status = 'Pending') AS pending_golden
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn content_stats(&self, limit: usize) -> AppResult<Vec<ContentStats>> {
        let stats = sqlx::query_as::<_, ContentStats>(
            r#"
            SELECT c.id, c.title, c.genre,
                   (SELECT COUNT(*) FROM ratings r WHERE r.content_id = c.id) AS total_ratings,
                   COALESCE((SELECT AVG(r.value)::float8 FROM ratings r WHERE r.content_id = c.id), 0)
                       AS average_rating,
                   (SELECT COUNT(*) FROM reviews v WHERE v.content_id = c.id) AS total_reviews
            FROM content c
            ORDER BY total_ratings DESC, c.id ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn overall_average_rating(&self) -> AppResult<f64> {
        let average =
            sqlx::query_scalar::<_, f64>("SELECT COALESCE(AVG(value)::float8, 0) FROM ratings")
                .fetch_one(&self.pool)
                .await?;

        Ok(average)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("noir"), "%noir%");
        assert_eq!(contains_pattern("100%_real"), "%100\\%\\_real%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_browse_order_breaks_ties_on_id() {
        for sort in [
            BrowseSort::Newest,
            BrowseSort::Oldest,
            BrowseSort::Title,
            BrowseSort::TitleDesc,
            BrowseSort::ReleaseDate,
            BrowseSort::ReleaseDateDesc,
            BrowseSort::TopRated,
        ] {
            assert!(browse_order(sort).ends_with("c.id ASC"));
        }
    }
}
